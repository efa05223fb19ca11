//! Backend implementations of the domain persistence contracts.

pub mod demo;
pub mod images;
pub mod inventory;
pub mod school_registry;

pub use demo::DemoInventoryStore;
pub use images::{DemoImageUploader, RemoteImageUploader};
pub use inventory::RemoteInventoryGateway;
pub use school_registry::{DemoSchoolRegistry, RemoteSchoolRegistry};
