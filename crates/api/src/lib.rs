//! HTTP surface for Edukit Manager.
//!
//! One process serves one session: an admin across every school, or a
//! single school resolved from its access code at start-up.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
