//! Category routes.

use axum::{extract::State, Json};
use domain::models::{effective_categories, DEFAULT_CATEGORIES};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    /// Defaults followed by the school's extras.
    pub categories: Vec<String>,
    pub extra_categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoriesRequest {
    pub categories: Vec<String>,
}

/// Trimmed, de-duplicated extras with the defaults removed.
fn normalize_extras(categories: &[String]) -> Vec<String> {
    let mut extras: Vec<String> = Vec::new();
    for category in categories.iter().map(|c| c.trim()) {
        if category.is_empty()
            || DEFAULT_CATEGORIES.contains(&category)
            || extras.iter().any(|c| c == category)
        {
            continue;
        }
        extras.push(category.to_string());
    }
    extras
}

/// Categories offered when editing an item.
///
/// GET /api/v1/categories
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let extras = state.categories.read().await.clone();
    Json(CategoriesResponse {
        categories: effective_categories(&extras),
        extra_categories: extras,
    })
}

/// Replace the school's extra categories.
///
/// PUT /api/v1/categories
pub async fn update_categories(
    State(state): State<AppState>,
    Json(request): Json<UpdateCategoriesRequest>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let Some(code) = state.scope.school_code() else {
        return Err(ApiError::Forbidden(
            "Categories belong to a school session".into(),
        ));
    };

    let extras = normalize_extras(&request.categories);
    state
        .backends
        .registry
        .update_categories(code, &extras)
        .await?;
    tracing::info!(school_code = %code, count = extras.len(), "Categories updated");

    *state.categories.write().await = extras.clone();
    Ok(Json(CategoriesResponse {
        categories: effective_categories(&extras),
        extra_categories: extras,
    }))
}
