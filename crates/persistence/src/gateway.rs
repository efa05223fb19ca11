//! Backend selection.
//!
//! [`Backends::connect`] picks demo or live implementations of every
//! persistence contract from the current [`Settings`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::error::GatewayError;
use domain::models::{InventoryItem, SchoolSelection};
use domain::services::{
    BestEffortPersist, ImageUploader, SchoolRegistry, TransactionalPersist, WriteOutcome,
};
use tracing::info;

use crate::client::ScriptClient;
use crate::kv::KeyValueStore;
use crate::repositories::{
    DemoImageUploader, DemoInventoryStore, DemoSchoolRegistry, RemoteImageUploader,
    RemoteInventoryGateway, RemoteSchoolRegistry,
};
use crate::settings::Settings;

/// Tunables shared by every backend.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub request_timeout: Duration,
    /// Inline images larger than this are dropped from item writes.
    pub max_inline_image_bytes: usize,
    pub max_upload_image_bytes: usize,
    /// Schools queried by the per-school fallback and seeded in demo mode.
    pub known_schools: Vec<String>,
    pub default_school: String,
    /// Registry endpoint; the inventory endpoint is used when empty.
    pub admin_script_url: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_inline_image_bytes: 4_000_000,
            max_upload_image_bytes: 3 * 1024 * 1024,
            known_schools: ["대건고", "신송고", "중산중", "신현중", "이음초", "DefaultSchool"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_school: "대건고".to_string(),
            admin_script_url: String::new(),
        }
    }
}

/// The inventory store selected for this session.
pub enum InventoryGateway {
    Demo(DemoInventoryStore),
    Remote(RemoteInventoryGateway),
}

impl InventoryGateway {
    pub fn is_demo(&self) -> bool {
        matches!(self, InventoryGateway::Demo(_))
    }

    fn inner(&self) -> &dyn TransactionalPersist {
        match self {
            InventoryGateway::Demo(store) => store,
            InventoryGateway::Remote(gateway) => gateway,
        }
    }
}

#[async_trait]
impl TransactionalPersist for InventoryGateway {
    async fn fetch_items(
        &self,
        selection: &SchoolSelection,
    ) -> Result<Vec<InventoryItem>, GatewayError> {
        self.inner().fetch_items(selection).await
    }

    async fn add_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError> {
        self.inner().add_item(item).await
    }

    async fn update_item(&self, item: &InventoryItem) -> Result<WriteOutcome, GatewayError> {
        self.inner().update_item(item).await
    }

    async fn delete_item(&self, id: &str, school: &str) -> Result<(), GatewayError> {
        self.inner().delete_item(id, school).await
    }
}

/// Every persistence contract, wired for one session.
#[derive(Clone)]
pub struct Backends {
    pub inventory: Arc<InventoryGateway>,
    pub registry: Arc<dyn SchoolRegistry>,
    pub locations: Arc<dyn BestEffortPersist>,
    pub images: Arc<dyn ImageUploader>,
}

impl Backends {
    pub fn connect(
        settings: &Settings,
        options: &GatewayOptions,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, GatewayError> {
        if settings.is_demo() {
            info!("Using demo storage");
            let inventory = DemoInventoryStore::new(
                store.clone(),
                options.known_schools.clone(),
                options.default_school.clone(),
            );
            let registry = Arc::new(DemoSchoolRegistry::new(
                store,
                options.known_schools.clone(),
            ));
            return Ok(Self {
                inventory: Arc::new(InventoryGateway::Demo(inventory)),
                registry: registry.clone(),
                locations: registry,
                images: Arc::new(DemoImageUploader::new(options.max_upload_image_bytes)),
            });
        }

        let inventory_client =
            ScriptClient::new(settings.script_url.clone(), options.request_timeout)?;
        let admin_url = if options.admin_script_url.trim().is_empty() {
            settings.script_url.clone()
        } else {
            options.admin_script_url.clone()
        };
        let registry_client = ScriptClient::new(admin_url, options.request_timeout)?;
        info!(
            endpoint = %inventory_client.endpoint(),
            registry = %registry_client.endpoint(),
            "Using live backend"
        );

        let registry = Arc::new(RemoteSchoolRegistry::new(registry_client));
        Ok(Self {
            inventory: Arc::new(InventoryGateway::Remote(RemoteInventoryGateway::new(
                inventory_client.clone(),
                options.known_schools.clone(),
                options.default_school.clone(),
                options.max_inline_image_bytes,
            ))),
            registry: registry.clone(),
            locations: registry,
            images: Arc::new(RemoteImageUploader::new(
                inventory_client,
                options.max_upload_image_bytes,
            )),
        })
    }
}
