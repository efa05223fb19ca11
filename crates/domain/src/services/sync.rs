//! Optimistic synchronisation of the local item lists with the inventory
//! backend.
//!
//! The controller keeps two lists: the items of the selected school and the
//! items of all schools. Mutations are applied to both lists before the
//! backend is called and are undone when the call fails. The state lock is
//! never held across a backend call, so readers may observe the optimistic
//! state while a request is in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use validator::Validate;

use super::persist::{TransactionalPersist, WriteOutcome};
use crate::error::SyncError;
use crate::models::{InventoryItem, ItemDraft, SchoolSelection};

#[derive(Debug)]
struct SyncState {
    selection: SchoolSelection,
    items: Vec<InventoryItem>,
    all_items: Vec<InventoryItem>,
    last_error: Option<String>,
    /// Token of the newest fetch applied to `items`.
    items_token: u64,
    /// Token of the newest fetch applied to `all_items`.
    all_items_token: u64,
}

/// Pre-mutation copy of both lists.
struct Snapshot {
    items: Vec<InventoryItem>,
    all_items: Vec<InventoryItem>,
}

pub struct SyncController {
    gateway: Arc<dyn TransactionalPersist>,
    default_school: String,
    state: RwLock<SyncState>,
    next_token: AtomicU64,
}

fn replace_by_id(list: &mut [InventoryItem], item: &InventoryItem) {
    for entry in list.iter_mut().filter(|i| i.id == item.id) {
        *entry = item.clone();
    }
}

fn rekey(list: &mut [InventoryItem], from: &str, to: &str) {
    for entry in list.iter_mut().filter(|i| i.id == from) {
        entry.id = to.to_string();
    }
}

fn log_warnings(outcome: &WriteOutcome) {
    for warning in &outcome.warnings {
        warn!(warning = %warning, "Write accepted with a degraded payload");
    }
}

impl SyncController {
    pub fn new(
        gateway: Arc<dyn TransactionalPersist>,
        selection: SchoolSelection,
        default_school: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            default_school: default_school.into(),
            state: RwLock::new(SyncState {
                selection,
                items: Vec::new(),
                all_items: Vec::new(),
                last_error: None,
                items_token: 0,
                all_items_token: 0,
            }),
            next_token: AtomicU64::new(0),
        }
    }

    pub async fn selection(&self) -> SchoolSelection {
        self.state.read().await.selection.clone()
    }

    /// Changes the selected school. The item list is not refetched.
    pub async fn set_selected_school(&self, selection: SchoolSelection) {
        self.state.write().await.selection = selection;
    }

    pub async fn items(&self) -> Vec<InventoryItem> {
        self.state.read().await.items.clone()
    }

    pub async fn all_items(&self) -> Vec<InventoryItem> {
        self.state.read().await.all_items.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.last_error = None;
    }

    pub fn default_school(&self) -> &str {
        &self.default_school
    }

    fn issue_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn fail<E: Into<SyncError>>(&self, error: E) -> SyncError {
        let error = error.into();
        self.state.write().await.last_error = Some(error.to_string());
        error
    }

    async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            items: state.items.clone(),
            all_items: state.all_items.clone(),
        }
    }

    async fn restore(&self, snapshot: Snapshot) {
        let mut state = self.state.write().await;
        state.items = snapshot.items;
        state.all_items = snapshot.all_items;
    }

    /// The school a new item is written to: the draft's, else the selected
    /// school, else the default school when all schools are selected.
    async fn target_school(&self, requested: Option<&str>) -> String {
        if let Some(school) = requested.map(str::trim).filter(|s| !s.is_empty()) {
            return school.to_string();
        }
        match &self.state.read().await.selection {
            SchoolSelection::School(name) => name.clone(),
            SchoolSelection::All => self.default_school.clone(),
        }
    }

    /// Adds an item optimistically.
    ///
    /// The new item is prepended to both lists under a client-generated id.
    /// If the backend rejects it the item is removed again and the error is
    /// returned; if the backend assigns a different id the local copies are
    /// re-keyed.
    pub async fn add_item(&self, draft: ItemDraft) -> Result<InventoryItem, SyncError> {
        if let Err(e) = draft.validate() {
            return Err(self.fail(e).await);
        }

        let school = self.target_school(draft.school.as_deref()).await;
        let item = draft.into_item(shared::id::generate_id(), school, Utc::now());
        let local_id = item.id.clone();

        {
            let mut state = self.state.write().await;
            state.items.insert(0, item.clone());
            state.all_items.insert(0, item.clone());
            state.last_error = None;
        }
        debug!(item_id = %local_id, school = %item.school, "Item added locally");

        match self.gateway.add_item(&item).await {
            Ok(outcome) => {
                log_warnings(&outcome);
                let mut item = item;
                if let Some(assigned) = outcome.assigned_id.filter(|id| id != &local_id) {
                    let mut state = self.state.write().await;
                    rekey(&mut state.items, &local_id, &assigned);
                    rekey(&mut state.all_items, &local_id, &assigned);
                    item.id = assigned;
                }
                info!(item_id = %item.id, school = %item.school, "Item added");
                Ok(item)
            }
            Err(e) => {
                {
                    let mut state = self.state.write().await;
                    state.items.retain(|i| i.id != local_id);
                    state.all_items.retain(|i| i.id != local_id);
                }
                warn!(item_id = %local_id, error = %e, "Add failed, rolled back");
                Err(self.fail(e).await)
            }
        }
    }

    /// Replaces an item optimistically, restoring both lists on failure.
    pub async fn update_item(&self, item: InventoryItem) -> Result<InventoryItem, SyncError> {
        let mut item = item;
        if item.school.trim().is_empty() {
            item.school = self.target_school(None).await;
        }
        item.last_updated = Utc::now();

        let snapshot = self.snapshot().await;
        {
            let mut state = self.state.write().await;
            replace_by_id(&mut state.items, &item);
            replace_by_id(&mut state.all_items, &item);
            state.last_error = None;
        }

        match self.gateway.update_item(&item).await {
            Ok(outcome) => {
                log_warnings(&outcome);
                info!(item_id = %item.id, school = %item.school, "Item updated");
                Ok(item)
            }
            Err(e) => {
                self.restore(snapshot).await;
                warn!(item_id = %item.id, error = %e, "Update failed, rolled back");
                Err(self.fail(e).await)
            }
        }
    }

    /// Removes an item optimistically, restoring both lists on failure.
    ///
    /// Without an explicit school the item's own school is used, then the
    /// selected school, then the default school.
    pub async fn delete_item(&self, id: &str, school: Option<&str>) -> Result<(), SyncError> {
        let explicit = school.map(str::trim).filter(|s| !s.is_empty());
        let school = match explicit {
            Some(school) => school.to_string(),
            None => {
                let own = {
                    let state = self.state.read().await;
                    let found = state
                        .items
                        .iter()
                        .chain(state.all_items.iter())
                        .find(|i| i.id == id && !i.school.is_empty())
                        .map(|i| i.school.clone());
                    found
                };
                match own {
                    Some(school) => school,
                    None => self.target_school(None).await,
                }
            }
        };

        let snapshot = self.snapshot().await;
        {
            let mut state = self.state.write().await;
            state.items.retain(|i| i.id != id);
            state.all_items.retain(|i| i.id != id);
            state.last_error = None;
        }

        match self.gateway.delete_item(id, &school).await {
            Ok(()) => {
                info!(item_id = %id, school = %school, "Item deleted");
                Ok(())
            }
            Err(e) => {
                self.restore(snapshot).await;
                warn!(item_id = %id, error = %e, "Delete failed, rolled back");
                Err(self.fail(e).await)
            }
        }
    }

    /// Refetches the selected (or given) school.
    ///
    /// The all-schools list is only replaced when the target is the
    /// aggregate scope. A fetch that completes after a newer one has been
    /// applied is discarded. Returns the selected list as it stands after
    /// the refresh.
    pub async fn refresh_items(
        &self,
        school_override: Option<SchoolSelection>,
    ) -> Result<Vec<InventoryItem>, SyncError> {
        let target = match school_override {
            Some(selection) => selection,
            None => self.selection().await,
        };
        let token = self.issue_token();

        let fetched = match self.gateway.fetch_items(&target).await {
            Ok(items) => items,
            Err(e) => {
                warn!(school = %target, error = %e, "Refresh failed");
                return Err(self.fail(e).await);
            }
        };

        let mut state = self.state.write().await;
        if token <= state.items_token {
            debug!(school = %target, token, "Discarding stale refresh");
            return Ok(state.items.clone());
        }
        state.items_token = token;
        if target.is_all() && token > state.all_items_token {
            state.all_items_token = token;
            state.all_items = fetched.clone();
        }
        info!(school = %target, count = fetched.len(), "Items refreshed");
        state.items = fetched;
        state.last_error = None;
        Ok(state.items.clone())
    }

    /// Refetches the all-schools list only.
    pub async fn refresh_dashboard(&self) -> Result<Vec<InventoryItem>, SyncError> {
        let token = self.issue_token();
        let fetched = match self.gateway.fetch_items(&SchoolSelection::All).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Dashboard refresh failed");
                return Err(self.fail(e).await);
            }
        };

        let mut state = self.state.write().await;
        if token <= state.all_items_token {
            debug!(token, "Discarding stale dashboard refresh");
            return Ok(state.all_items.clone());
        }
        state.all_items_token = token;
        info!(count = fetched.len(), "All-schools items refreshed");
        state.all_items = fetched;
        Ok(state.all_items.clone())
    }
}
