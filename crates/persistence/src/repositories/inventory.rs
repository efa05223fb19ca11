//! Live inventory backend: one Apps Script deployment per school.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use domain::error::GatewayError;
use domain::models::{InventoryItem, SchoolSelection, ALL_SCHOOLS_KEY};
use domain::services::{GatewayWarning, TransactionalPersist, WriteOutcome};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::client::ScriptClient;
use crate::wire::{CreatedRow, WriteRequest};

const FETCH_FAILED_MESSAGE: &str = "데이터를 불러오는데 실패했습니다.";

/// Inventory gateway talking to a school's script endpoint.
#[derive(Debug, Clone)]
pub struct RemoteInventoryGateway {
    client: ScriptClient,
    known_schools: Vec<String>,
    default_school: String,
    max_inline_image_bytes: usize,
}

impl RemoteInventoryGateway {
    pub fn new(
        client: ScriptClient,
        known_schools: Vec<String>,
        default_school: impl Into<String>,
        max_inline_image_bytes: usize,
    ) -> Self {
        Self {
            client,
            known_schools,
            default_school: default_school.into(),
            max_inline_image_bytes,
        }
    }

    fn school_or_default<'a>(&'a self, school: &'a str) -> &'a str {
        if school.trim().is_empty() {
            &self.default_school
        } else {
            school
        }
    }

    /// Copy of `item` as it goes on the wire.
    ///
    /// `lastUpdated` is stamped now; an inline image over the ceiling is
    /// dropped and reported.
    fn outgoing(&self, item: &InventoryItem) -> (InventoryItem, Vec<GatewayWarning>) {
        let mut outgoing = item.clone();
        outgoing.last_updated = Utc::now();
        outgoing.school = self.school_or_default(&item.school).to_string();

        let mut warnings = Vec::new();
        if let Some(data_url) = &outgoing.image_base64 {
            let size = shared::image::inline_payload_len(data_url);
            if size > self.max_inline_image_bytes {
                warn!(
                    item_id = %item.id,
                    size,
                    limit = self.max_inline_image_bytes,
                    "Inline image exceeds the request ceiling, sending without it"
                );
                warnings.push(GatewayWarning::PayloadTooLarge {
                    item_id: item.id.clone(),
                    size,
                    limit: self.max_inline_image_bytes,
                });
                outgoing.image_base64 = None;
            }
        }
        (outgoing, warnings)
    }

    async fn fetch_merged_by_school(&self) -> Vec<InventoryItem> {
        let mut tasks = JoinSet::new();
        for school in &self.known_schools {
            let client = self.client.clone();
            let school = school.clone();
            tasks.spawn(async move {
                let result = fetch_school(&client, &school).await;
                (school, result)
            });
        }

        let mut merged: Vec<InventoryItem> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(items))) => {
                    for item in items {
                        match positions.get(&item.id) {
                            Some(&pos) => merged[pos] = item,
                            None => {
                                positions.insert(item.id.clone(), merged.len());
                                merged.push(item);
                            }
                        }
                    }
                }
                Ok((school, Err(e))) => {
                    warn!(school = %school, error = %e, "School fetch failed during fallback");
                }
                Err(e) => {
                    warn!(error = %e, "School fetch task did not complete");
                }
            }
        }
        merged
    }
}

async fn fetch_school(client: &ScriptClient, school: &str) -> Result<Vec<InventoryItem>, GatewayError> {
    let envelope = client.get("fetch_items", &[("school", school)]).await?;
    let mut items: Vec<InventoryItem> = envelope.data()?.ok_or_else(|| {
        GatewayError::BackendRejected(
            envelope
                .message
                .clone()
                .unwrap_or_else(|| FETCH_FAILED_MESSAGE.to_string()),
        )
    })?;

    if school != ALL_SCHOOLS_KEY {
        for item in items.iter_mut().filter(|i| i.school.trim().is_empty()) {
            item.school = school.to_string();
        }
    }
    Ok(items)
}

#[async_trait]
impl TransactionalPersist for RemoteInventoryGateway {
    async fn fetch_items(
        &self,
        selection: &SchoolSelection,
    ) -> Result<Vec<InventoryItem>, GatewayError> {
        if let SchoolSelection::School(school) = selection {
            return fetch_school(&self.client, self.school_or_default(school)).await;
        }

        match fetch_school(&self.client, ALL_SCHOOLS_KEY).await {
            Ok(items) if !items.is_empty() => return Ok(items),
            Ok(_) => debug!("Aggregate fetch returned nothing, fetching per school"),
            Err(e) => debug!(error = %e, "Aggregate fetch unsupported, fetching per school"),
        }

        let merged = self.fetch_merged_by_school().await;
        info!(
            schools = self.known_schools.len(),
            count = merged.len(),
            "Merged per-school inventory"
        );
        Ok(merged)
    }

    async fn add_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError> {
        let (outgoing, warnings) = self.outgoing(item);
        let envelope = self
            .client
            .post("add_item", &WriteRequest::create(&outgoing))
            .await?;

        let assigned_id = envelope
            .data::<CreatedRow>()
            .ok()
            .flatten()
            .and_then(|row| row.id())
            .filter(|id| *id != item.id);
        if let Some(id) = &assigned_id {
            debug!(local_id = %item.id, assigned_id = %id, "Backend assigned item id");
        }

        Ok(WriteOutcome {
            assigned_id,
            warnings,
        })
    }

    async fn update_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError> {
        let (outgoing, warnings) = self.outgoing(item);
        self.client
            .post("update_item", &WriteRequest::update(&outgoing))
            .await?;
        Ok(WriteOutcome {
            assigned_id: None,
            warnings,
        })
    }

    async fn delete_item(&self, id: &str, school: &str) -> Result<(), GatewayError> {
        let school = self.school_or_default(school);
        self.client
            .post("delete_item", &WriteRequest::delete(id, school))
            .await?;
        Ok(())
    }
}
