//! Domain error types.

use thiserror::Error;

/// Failures talking to a remote endpoint.
///
/// Payloads too large to send inline are not errors; they degrade the
/// request and are reported as [`crate::services::GatewayWarning`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request could not be sent, timed out, or returned a non-2xx status.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The backend answered with `success: false`.
    ///
    /// Missing targets ("not found") arrive here with the backend's message.
    #[error("Backend rejected the request: {0}")]
    BackendRejected(String),

    /// The response body was not JSON or did not have the expected shape.
    #[error("Unexpected response: {0}")]
    ParseFailure(String),

    /// Input was refused before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors returned by the sync controller.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The remote write failed; local state has already been rolled back.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
