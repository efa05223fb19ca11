//! Inventory item routes.
//!
//! Writes go through the sync controller, which applies them locally first
//! and rolls back when the backend refuses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{InventoryItem, ItemDraft, SchoolSelection};
use domain::services::search;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SchoolQuery {
    #[serde(default)]
    pub school: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemListResponse {
    pub items: Vec<InventoryItem>,
    pub count: usize,
}

impl From<Vec<InventoryItem>> for ItemListResponse {
    fn from(items: Vec<InventoryItem>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// List the selected school's items, optionally filtered by a search term.
///
/// GET /api/v1/items?q=
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<ItemListResponse> {
    let items = state.sync.items().await;
    let matched: Vec<InventoryItem> = search(&items, query.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(matched.into())
}

/// List the all-schools items.
///
/// GET /api/v1/items/all
pub async fn list_all_items(State(state): State<AppState>) -> Json<ItemListResponse> {
    Json(state.sync.all_items().await.into())
}

/// Add an item.
///
/// POST /api/v1/items
pub async fn create_item(
    State(state): State<AppState>,
    Json(mut draft): Json<ItemDraft>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    if let Some(name) = state.scope.school_name() {
        draft.school = Some(name.to_string());
    }

    let item = state.sync.add_item(draft).await?;
    tracing::info!(item_id = %item.id, school = %item.school, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace an item.
///
/// PUT /api/v1/items/:item_id
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(mut item): Json<InventoryItem>,
) -> Result<Json<InventoryItem>, ApiError> {
    item.id = item_id;
    if let Some(name) = state.scope.school_name() {
        item.school = name.to_string();
    }

    let item = state.sync.update_item(item).await?;
    tracing::info!(item_id = %item.id, "Item updated");
    Ok(Json(item))
}

/// Delete an item.
///
/// DELETE /api/v1/items/:item_id?school=
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<SchoolQuery>,
) -> Result<StatusCode, ApiError> {
    let school = match state.scope.school_name() {
        Some(name) => Some(name.to_string()),
        None => query.school,
    };

    state.sync.delete_item(&item_id, school.as_deref()).await?;
    tracing::info!(item_id = %item_id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Reload the selected school, or another school for an admin.
///
/// POST /api/v1/items/refresh?school=
pub async fn refresh_items(
    State(state): State<AppState>,
    Query(query): Query<SchoolQuery>,
) -> Result<Json<ItemListResponse>, ApiError> {
    let school_override = if state.scope.is_admin() {
        query.school.as_deref().map(SchoolSelection::parse)
    } else {
        None
    };

    let items = state.sync.refresh_items(school_override).await?;
    Ok(Json(items.into()))
}
