//! Session scope guards.
//!
//! The scope is fixed when the process starts; these guards only decide
//! which route groups that scope may reach.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;

/// Allows the request only for an admin session.
pub async fn require_admin_scope(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.scope.is_admin() {
        next.run(req).await
    } else {
        ApiError::Forbidden("Admin access required".into()).into_response()
    }
}

/// Allows the request only for a school session.
pub async fn require_school_scope(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.scope.is_admin() {
        ApiError::Forbidden("This action belongs to a school session".into()).into_response()
    } else {
        next.run(req).await
    }
}
