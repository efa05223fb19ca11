//! Image upload backends.

use async_trait::async_trait;
use domain::error::GatewayError;
use domain::services::ImageUploader;
use tracing::info;

use crate::client::ScriptClient;
use crate::wire::ActionRequest;

fn check_upload(bytes: &[u8], mime: &str, max_bytes: usize) -> Result<(), GatewayError> {
    if !shared::image::is_image_mime(mime) {
        return Err(GatewayError::InvalidInput(format!(
            "only image files can be uploaded, got {}",
            mime
        )));
    }
    if bytes.is_empty() {
        return Err(GatewayError::InvalidInput("image data is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(GatewayError::InvalidInput(format!(
            "image is {} bytes, the limit is {}",
            bytes.len(),
            max_bytes
        )));
    }
    Ok(())
}

/// Uploads to the school script's Drive folder.
#[derive(Debug, Clone)]
pub struct RemoteImageUploader {
    client: ScriptClient,
    max_bytes: usize,
}

impl RemoteImageUploader {
    pub fn new(client: ScriptClient, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl ImageUploader for RemoteImageUploader {
    async fn upload_image(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime: &str,
    ) -> Result<String, GatewayError> {
        check_upload(bytes, mime, self.max_bytes)?;
        let data_url = shared::image::to_data_url(bytes, mime);
        let envelope = self
            .client
            .post(
                "upload_image",
                &ActionRequest::UploadImage {
                    image_data: &data_url,
                    file_name,
                },
            )
            .await?;

        let url = envelope
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GatewayError::ParseFailure("upload response has no url".to_string()))?;
        info!(file_name, size = bytes.len(), "Image uploaded");
        Ok(url)
    }
}

/// Keeps images inline as data URLs.
#[derive(Debug, Clone)]
pub struct DemoImageUploader {
    max_bytes: usize,
}

impl DemoImageUploader {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl ImageUploader for DemoImageUploader {
    async fn upload_image(
        &self,
        bytes: &[u8],
        _file_name: &str,
        mime: &str,
    ) -> Result<String, GatewayError> {
        check_upload(bytes, mime, self.max_bytes)?;
        Ok(shared::image::to_data_url(bytes, mime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_demo_returns_data_url() {
        let url = DemoImageUploader::new(1024)
            .upload_image(b"abc", "a.png", "image/png")
            .await
            .unwrap();
        assert_eq!(url, "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let err = DemoImageUploader::new(1024)
            .upload_image(b"%PDF", "a.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_rejects_oversized() {
        let err = DemoImageUploader::new(2)
            .upload_image(b"abc", "a.png", "image/png")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidInput("image is 3 bytes, the limit is 2".to_string())
        );
    }

    #[tokio::test]
    async fn test_remote_posts_data_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "action": "uploadImage",
                "imageData": "data:image/png;base64,YWJj",
                "fileName": "a.png"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "url": "https://lh3.googleusercontent.com/d/file1",
                "fileId": "file1",
                "fileName": "a.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ScriptClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        let url = RemoteImageUploader::new(client, 1024)
            .upload_image(b"abc", "a.png", "image/png")
            .await
            .unwrap();
        assert_eq!(url, "https://lh3.googleusercontent.com/d/file1");
    }

    #[tokio::test]
    async fn test_remote_oversized_never_sends() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(0)
            .mount(&server)
            .await;

        let client = ScriptClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        let err = RemoteImageUploader::new(client, 2)
            .upload_image(b"abc", "a.png", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }
}
