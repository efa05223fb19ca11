//! School registry routes for the admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::error::GatewayError;
use domain::models::{NewSchool, SchoolConfig};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Attempts before giving up on finding an unused school code.
const CODE_ATTEMPTS: usize = 20;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub username: String,
    pub old_password: String,
    #[validate(length(min = 4, message = "New password must be at least 4 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct GeneratedCodeResponse {
    pub code: String,
}

/// Check admin credentials against the registry.
///
/// POST /api/v1/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    request.validate()?;

    match state
        .backends
        .registry
        .admin_login(request.username.trim(), &request.password)
        .await
    {
        Ok(()) => {
            tracing::info!(username = %request.username.trim(), "Admin login accepted");
            Ok(Json(SuccessResponse { success: true }))
        }
        Err(GatewayError::BackendRejected(msg)) => Err(ApiError::Unauthorized(msg)),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/admin/schools
pub async fn list_schools(
    State(state): State<AppState>,
) -> Result<Json<Vec<SchoolConfig>>, ApiError> {
    let schools = state.backends.registry.get_schools().await?;
    Ok(Json(schools))
}

/// Register a school.
///
/// POST /api/v1/admin/schools
pub async fn create_school(
    State(state): State<AppState>,
    Json(request): Json<NewSchool>,
) -> Result<(StatusCode, Json<SchoolConfig>), ApiError> {
    request.validate()?;

    let school = state.backends.registry.add_school(&request).await?;
    tracing::info!(school_code = %school.code, name = %school.name, "School registered");
    Ok((StatusCode::CREATED, Json(school)))
}

/// Edit a school, possibly changing its code.
///
/// PUT /api/v1/admin/schools/:code
pub async fn update_school(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<NewSchool>,
) -> Result<Json<SchoolConfig>, ApiError> {
    request.validate()?;

    let school = state.backends.registry.update_school(&code, &request).await?;
    tracing::info!(original_code = %code, school_code = %school.code, "School updated");
    Ok(Json(school))
}

/// DELETE /api/v1/admin/schools/:code
pub async fn delete_school(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.backends.registry.delete_school(&code).await?;
    tracing::info!(school_code = %code, "School deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Propose an access code no registered school uses yet.
///
/// GET /api/v1/admin/schools/generate-code
pub async fn generate_code(
    State(state): State<AppState>,
) -> Result<Json<GeneratedCodeResponse>, ApiError> {
    let schools = state.backends.registry.get_schools().await?;
    for _ in 0..CODE_ATTEMPTS {
        let code = shared::id::generate_school_code();
        if !schools.iter().any(|s| s.code == code) {
            return Ok(Json(GeneratedCodeResponse { code }));
        }
    }
    Err(ApiError::Internal(
        "could not find an unused school code".into(),
    ))
}

/// PUT /api/v1/admin/password
pub async fn change_password(
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    state
        .backends
        .registry
        .change_password(
            request.username.trim(),
            &request.old_password,
            &request.new_password,
        )
        .await?;
    tracing::info!(username = %request.username.trim(), "Admin password changed");
    Ok(StatusCode::NO_CONTENT)
}
