//! Persistence layer for Edukit Manager.
//!
//! This crate contains:
//! - The Apps Script HTTP client and wire envelopes
//! - Inventory gateway implementations (live backend and demo store)
//! - School registry and image upload implementations
//! - The injected key-value store and persisted settings
//! - Gateway request metrics

pub mod client;
pub mod gateway;
pub mod kv;
pub mod metrics;
pub mod repositories;
pub mod seed;
pub mod settings;
pub mod wire;

pub use gateway::{Backends, GatewayOptions, InventoryGateway};
pub use kv::{KeyValueStore, MemoryStore};
pub use settings::Settings;
