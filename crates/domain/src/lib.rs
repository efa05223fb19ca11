//! Domain layer for Edukit Manager.
//!
//! This crate contains:
//! - Domain models (InventoryItem, location tree, SchoolConfig)
//! - The location codec, location tree store and reporting builders
//! - The optimistic sync controller
//! - Persistence contracts implemented by the persistence crate
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
