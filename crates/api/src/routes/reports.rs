//! Location report routes.

use axum::{extract::State, Json};
use domain::models::{InventoryItem, LocationReport};
use domain::services::{build_location_report, visible_items};

use crate::app::AppState;

/// Room, shelf and slot totals over the items visible to this session.
///
/// GET /api/v1/reports/locations
pub async fn location_report(State(state): State<AppState>) -> Json<LocationReport> {
    let selection = state.sync.selection().await;
    let items = state.sync.items().await;
    let all_items = state.sync.all_items().await;
    let visible: Vec<InventoryItem> = visible_items(&state.scope, &selection, &items, &all_items)
        .into_iter()
        .cloned()
        .collect();
    Json(build_location_report(&visible))
}
