//! Domain services for Edukit Manager.
//!
//! Services contain business logic that operates on domain models.

pub mod aggregation;
pub mod dashboard;
pub mod location_codec;
pub mod location_tree;
pub mod persist;
pub mod sync;

pub use aggregation::{build_location_report, OTHER_SHELF, WHOLE_SHELF_SLOT};
pub use dashboard::{search, summarize, visible_items};
pub use location_codec::{encode, parse_location, LocationSelection, ParsedLocation, UNASSIGNED_ROOM};
pub use location_tree::LocationTreeStore;
pub use persist::{
    BestEffortPersist, GatewayWarning, ImageUploader, SchoolRegistry, TransactionalPersist,
    WriteOutcome,
};
pub use sync::SyncController;
