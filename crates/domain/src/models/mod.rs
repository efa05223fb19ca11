//! Domain models for Edukit Manager.

pub mod dashboard;
pub mod item;
mod lenient;
pub mod location;
pub mod report;
pub mod school;

pub use dashboard::{CategoryQuantity, DashboardSummary};
pub use item::{InventoryItem, ItemDraft, ItemStatus};
pub use location::{LocationOption, LocationRoom, LocationShelf, LocationSlot, LocationTree};
pub use report::{LocationReport, RoomSummary, ShelfSummary, SlotSummary};
pub use school::{
    effective_categories, NewSchool, SchoolConfig, SchoolLookupResult, SchoolScope,
    SchoolSelection, ALL_SCHOOLS_KEY, DEFAULT_CATEGORIES,
};
