//! Persistence contracts consumed by the domain services.
//!
//! Inventory writes go through [`TransactionalPersist`]: the caller waits
//! for the result and undoes its local change when the write fails.
//! Location trees go through [`BestEffortPersist`]: the write is fired in
//! the background and a failure never touches local state.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GatewayError;
use crate::models::{InventoryItem, LocationRoom, NewSchool, SchoolConfig, SchoolSelection};

/// Non-fatal conditions reported by a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayWarning {
    /// The inline image was dropped from the request; the item kept its
    /// existing image URL.
    PayloadTooLarge {
        item_id: String,
        size: usize,
        limit: usize,
    },
}

impl std::fmt::Display for GatewayWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayWarning::PayloadTooLarge {
                item_id,
                size,
                limit,
            } => write!(
                f,
                "inline image for item {} dropped ({} bytes, limit {})",
                item_id, size, limit
            ),
        }
    }
}

/// Result of an accepted inventory write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Id assigned by the backend, when it differs from or replaces ours.
    pub assigned_id: Option<String>,
    pub warnings: Vec<GatewayWarning>,
}

impl WriteOutcome {
    pub fn accepted() -> Self {
        Self::default()
    }
}

/// Inventory store whose writes either succeed or fail as a whole.
#[async_trait]
pub trait TransactionalPersist: Send + Sync {
    async fn fetch_items(
        &self,
        selection: &SchoolSelection,
    ) -> Result<Vec<InventoryItem>, GatewayError>;

    async fn add_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError>;

    async fn update_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError>;

    async fn delete_item(&self, id: &str, school: &str) -> Result<(), GatewayError>;
}

/// Fire-and-forget store for a school's location tree.
#[async_trait]
pub trait BestEffortPersist: Send + Sync {
    async fn persist_locations(
        &self,
        school_code: &str,
        rooms: &[LocationRoom],
    ) -> Result<(), GatewayError>;
}

/// The admin-owned roster of schools.
#[async_trait]
pub trait SchoolRegistry: Send + Sync {
    async fn get_schools(&self) -> Result<Vec<SchoolConfig>, GatewayError>;

    /// Resolves a school access code to its record.
    async fn verify_code(&self, code: &str) -> Result<SchoolConfig, GatewayError>;

    async fn admin_login(&self, username: &str, password: &str) -> Result<(), GatewayError>;

    async fn add_school(&self, school: &NewSchool) -> Result<SchoolConfig, GatewayError>;

    /// Edits the school currently registered under `original_code`.
    async fn update_school(
        &self,
        original_code: &str,
        school: &NewSchool,
    ) -> Result<SchoolConfig, GatewayError>;

    async fn delete_school(&self, code: &str) -> Result<(), GatewayError>;

    async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), GatewayError>;

    async fn update_categories(&self, code: &str, categories: &[String])
        -> Result<(), GatewayError>;

    async fn update_locations(
        &self,
        code: &str,
        rooms: &[LocationRoom],
    ) -> Result<(), GatewayError>;
}

/// External image hosting.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads an image and returns the URL it can be displayed from.
    async fn upload_image(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime: &str,
    ) -> Result<String, GatewayError>;
}
