//! Demo-mode inventory kept in the key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use domain::error::GatewayError;
use domain::models::{InventoryItem, SchoolSelection};
use domain::services::{TransactionalPersist, WriteOutcome};
use tokio::sync::Mutex;
use tracing::debug;

use crate::kv::{get_json, set_json, KeyValueStore};
use crate::seed::sample_items;

pub const DEMO_ITEMS_PREFIX: &str = "demo_items_";

pub fn demo_items_key(school: &str) -> String {
    format!("{}{}", DEMO_ITEMS_PREFIX, school)
}

/// Per-school item lists under `demo_items_<school>`.
///
/// A school with nothing stored yet reads as its sample inventory. Writes
/// are accepted locally and never fail for a missing item.
pub struct DemoInventoryStore {
    store: Arc<dyn KeyValueStore>,
    known_schools: Vec<String>,
    default_school: String,
    write_lock: Mutex<()>,
}

impl DemoInventoryStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        known_schools: Vec<String>,
        default_school: impl Into<String>,
    ) -> Self {
        Self {
            store,
            known_schools,
            default_school: default_school.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn school_of<'a>(&'a self, school: &'a str) -> &'a str {
        if school.trim().is_empty() {
            &self.default_school
        } else {
            school
        }
    }

    fn load(&self, school: &str) -> Vec<InventoryItem> {
        get_json(self.store.as_ref(), &demo_items_key(school)).unwrap_or_else(|| sample_items(school))
    }

    fn save(&self, school: &str, items: &[InventoryItem]) -> Result<(), GatewayError> {
        set_json(self.store.as_ref(), &demo_items_key(school), items)
    }

    /// Known schools followed by any other school that has stored items.
    fn all_schools(&self) -> Vec<String> {
        let mut schools = self.known_schools.clone();
        for key in self.store.keys_with_prefix(DEMO_ITEMS_PREFIX) {
            let school = &key[DEMO_ITEMS_PREFIX.len()..];
            if !school.is_empty() && !schools.iter().any(|s| s == school) {
                schools.push(school.to_string());
            }
        }
        schools
    }
}

/// Uploads pending in demo mode become the item's image URL.
fn settle_inline_image(item: &InventoryItem) -> InventoryItem {
    let mut stored = item.clone();
    if let Some(data_url) = stored.image_base64.take() {
        stored.image_url = Some(data_url);
    }
    stored
}

#[async_trait]
impl TransactionalPersist for DemoInventoryStore {
    async fn fetch_items(
        &self,
        selection: &SchoolSelection,
    ) -> Result<Vec<InventoryItem>, GatewayError> {
        let items = match selection {
            SchoolSelection::All => self
                .all_schools()
                .iter()
                .flat_map(|school| self.load(school))
                .collect(),
            SchoolSelection::School(school) => self.load(self.school_of(school)),
        };
        debug!(school = %selection, count = items.len(), "Demo items loaded");
        Ok(items)
    }

    async fn add_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let school = self.school_of(&item.school);
        let mut items = self.load(school);
        let mut stored = settle_inline_image(item);
        stored.school = school.to_string();
        items.insert(0, stored);
        self.save(school, &items)?;
        Ok(WriteOutcome::accepted())
    }

    async fn update_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let school = self.school_of(&item.school);
        let mut items = self.load(school);
        if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
            *existing = settle_inline_image(item);
            existing.school = school.to_string();
        }
        self.save(school, &items)?;
        Ok(WriteOutcome::accepted())
    }

    async fn delete_item(&self, id: &str, school: &str) -> Result<(), GatewayError> {
        let _guard = self.write_lock.lock().await;
        let school = self.school_of(school);
        let mut items = self.load(school);
        items.retain(|i| i.id != id);
        self.save(school, &items)
    }
}
