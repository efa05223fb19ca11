//! Session scope and school selection routes.

use axum::{extract::State, Json};
use domain::models::SchoolSelection;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;

/// The current session as seen by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    pub selected_school: SchoolSelection,
    pub demo_mode: bool,
    pub known_schools: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectSchoolRequest {
    pub school: SchoolSelection,
}

pub(crate) async fn session_response(state: &AppState) -> SessionResponse {
    SessionResponse {
        is_admin: state.scope.is_admin(),
        school_code: state.scope.school_code().map(str::to_string),
        school_name: state.scope.school_name().map(str::to_string),
        selected_school: state.sync.selection().await,
        demo_mode: state.backends.inventory.is_demo(),
        known_schools: state.config.backend.known_schools.clone(),
        last_error: state.sync.last_error().await,
    }
}

/// Describe the current session.
///
/// GET /api/v1/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(session_response(&state).await)
}

/// Change which school an admin is looking at and reload its items.
///
/// PUT /api/v1/session/selection
pub async fn select_school(
    State(state): State<AppState>,
    Json(request): Json<SelectSchoolRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if !state.scope.is_admin() {
        return Err(ApiError::Forbidden(
            "A school session is pinned to its own school".into(),
        ));
    }

    state.sync.set_selected_school(request.school.clone()).await;
    state.remember_selection(&request.school);
    tracing::info!(school = %request.school, "School selected");

    state.sync.refresh_items(None).await?;
    Ok(Json(session_response(&state).await))
}
