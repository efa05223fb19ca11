//! Image upload route.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub url: String,
}

/// Upload an item photo and return the URL to store on the item.
///
/// POST /api/v1/images
pub async fn upload_image(
    State(state): State<AppState>,
    Json(request): Json<UploadImageRequest>,
) -> Result<(StatusCode, Json<UploadImageResponse>), ApiError> {
    let mime = shared::image::data_url_mime(&request.data_url)
        .ok_or_else(|| ApiError::Validation("dataUrl must be a data URL".into()))?;
    let bytes = shared::image::decode_data_url(&request.data_url)
        .ok_or_else(|| ApiError::Validation("dataUrl must carry base64 data".into()))?;

    let url = state
        .backends
        .images
        .upload_image(&bytes, request.file_name.trim(), mime)
        .await?;
    Ok((StatusCode::CREATED, Json(UploadImageResponse { url })))
}
