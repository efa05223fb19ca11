//! Location tree routes.
//!
//! Every mutation answers from the local tree at once; the tree is written
//! to the registry in the background.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{LocationOption, LocationTree};
use domain::services::LocationTreeStore;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQuery {
    pub room_id: String,
    #[serde(default)]
    pub shelf_id: Option<String>,
    #[serde(default)]
    pub slot_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub location: String,
}

fn tree_store(state: &AppState) -> Result<Arc<Mutex<LocationTreeStore>>, ApiError> {
    state
        .locations
        .clone()
        .ok_or_else(|| ApiError::Forbidden("Locations belong to a school session".into()))
}

fn validated(request: NameRequest) -> Result<String, ApiError> {
    request.validate()?;
    Ok(request.name.trim().to_string())
}

fn created(
    id: Option<String>,
    missing: &str,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    id.map(|id| (StatusCode::CREATED, Json(CreatedResponse { id })))
        .ok_or_else(|| ApiError::NotFound(missing.to_string()))
}

fn changed(found: bool, missing: &str) -> Result<StatusCode, ApiError> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(missing.to_string()))
    }
}

/// The school's location tree.
///
/// GET /api/v1/locations
pub async fn get_tree(State(state): State<AppState>) -> Result<Json<LocationTree>, ApiError> {
    let store = tree_store(&state)?;
    let tree = store.lock().await.tree().clone();
    Ok(Json(tree))
}

/// Every selectable location, depth first.
///
/// GET /api/v1/locations/options
pub async fn list_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationOption>>, ApiError> {
    let store = tree_store(&state)?;
    let options = store.lock().await.location_options();
    Ok(Json(options))
}

/// The stored location string for a room, shelf and slot.
///
/// GET /api/v1/locations/resolve?roomId=&shelfId=&slotId=
pub async fn resolve_location(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let store = tree_store(&state)?;
    let location = store.lock().await.location_string(
        &query.room_id,
        query.shelf_id.as_deref(),
        query.slot_id.as_deref(),
    );
    if location.is_empty() {
        return Err(ApiError::NotFound("Room not found".into()));
    }
    Ok(Json(ResolveResponse { location }))
}

/// POST /api/v1/locations/rooms
pub async fn add_room(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let id = store.lock().await.add_room(&name);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/v1/locations/rooms/:room_id
pub async fn rename_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<NameRequest>,
) -> Result<StatusCode, ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let found = store.lock().await.update_room(&room_id, &name);
    changed(found, "Room not found")
}

/// Remove a room with its shelves and slots.
///
/// DELETE /api/v1/locations/rooms/:room_id
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = tree_store(&state)?;
    let found = store.lock().await.delete_room(&room_id);
    changed(found, "Room not found")
}

/// Copy a room and everything under it under a new name.
///
/// POST /api/v1/locations/rooms/:room_id/duplicate
pub async fn duplicate_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let id = store.lock().await.duplicate_room(&room_id, &name);
    created(id, "Room not found")
}

/// POST /api/v1/locations/rooms/:room_id/shelves
pub async fn add_shelf(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let id = store.lock().await.add_shelf(&room_id, &name);
    created(id, "Room not found")
}

/// PUT /api/v1/locations/rooms/:room_id/shelves/:shelf_id
pub async fn rename_shelf(
    State(state): State<AppState>,
    Path((room_id, shelf_id)): Path<(String, String)>,
    Json(request): Json<NameRequest>,
) -> Result<StatusCode, ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let found = store.lock().await.update_shelf(&room_id, &shelf_id, &name);
    changed(found, "Shelf not found")
}

/// DELETE /api/v1/locations/rooms/:room_id/shelves/:shelf_id
pub async fn delete_shelf(
    State(state): State<AppState>,
    Path((room_id, shelf_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let store = tree_store(&state)?;
    let found = store.lock().await.delete_shelf(&room_id, &shelf_id);
    changed(found, "Shelf not found")
}

/// POST /api/v1/locations/rooms/:room_id/shelves/:shelf_id/duplicate
pub async fn duplicate_shelf(
    State(state): State<AppState>,
    Path((room_id, shelf_id)): Path<(String, String)>,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let id = store
        .lock()
        .await
        .duplicate_shelf(&room_id, &shelf_id, &name);
    created(id, "Shelf not found")
}

/// POST /api/v1/locations/rooms/:room_id/shelves/:shelf_id/slots
pub async fn add_slot(
    State(state): State<AppState>,
    Path((room_id, shelf_id)): Path<(String, String)>,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let id = store.lock().await.add_slot(&room_id, &shelf_id, &name);
    created(id, "Shelf not found")
}

/// PUT /api/v1/locations/rooms/:room_id/shelves/:shelf_id/slots/:slot_id
pub async fn rename_slot(
    State(state): State<AppState>,
    Path((room_id, shelf_id, slot_id)): Path<(String, String, String)>,
    Json(request): Json<NameRequest>,
) -> Result<StatusCode, ApiError> {
    let name = validated(request)?;
    let store = tree_store(&state)?;
    let found = store
        .lock()
        .await
        .update_slot(&room_id, &shelf_id, &slot_id, &name);
    changed(found, "Slot not found")
}

/// DELETE /api/v1/locations/rooms/:room_id/shelves/:shelf_id/slots/:slot_id
pub async fn delete_slot(
    State(state): State<AppState>,
    Path((room_id, shelf_id, slot_id)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    let store = tree_store(&state)?;
    let found = store
        .lock()
        .await
        .delete_slot(&room_id, &shelf_id, &slot_id);
    changed(found, "Slot not found")
}
