//! HTTP route handlers.

pub mod categories;
pub mod dashboard;
pub mod health;
pub mod images;
pub mod items;
pub mod locations;
pub mod reports;
pub mod schools;
pub mod session;
