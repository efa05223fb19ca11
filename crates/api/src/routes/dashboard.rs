//! Dashboard summary routes.

use axum::{extract::State, Json};
use domain::models::DashboardSummary;
use domain::services::{summarize, visible_items};

use crate::app::AppState;
use crate::error::ApiError;

async fn current_summary(state: &AppState) -> DashboardSummary {
    let selection = state.sync.selection().await;
    let items = state.sync.items().await;
    let all_items = state.sync.all_items().await;
    summarize(&visible_items(&state.scope, &selection, &items, &all_items))
}

/// Totals over the items visible to this session.
///
/// GET /api/v1/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(current_summary(&state).await)
}

/// Reload the lists the dashboard counts, then summarize.
///
/// POST /api/v1/dashboard/refresh
pub async fn refresh_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    if state.scope.is_admin() {
        state.sync.refresh_dashboard().await?;
    } else {
        state.sync.refresh_items(None).await?;
    }
    Ok(Json(current_summary(&state).await))
}
