//! HTTP client for Apps Script web app endpoints.

use std::time::Duration;

use domain::error::GatewayError;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::metrics::RequestTimer;
use crate::wire::ScriptEnvelope;

/// A client bound to one Apps Script deployment URL.
///
/// Requests are never retried.
#[derive(Debug, Clone)]
pub struct ScriptClient {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl ScriptClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::NetworkFailure(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim().to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `GET <endpoint>?<query>`.
    pub async fn get(
        &self,
        operation: &str,
        query: &[(&str, &str)],
    ) -> Result<ScriptEnvelope, GatewayError> {
        debug!(operation, endpoint = %self.endpoint, "GET");
        let request = self.http.get(&self.endpoint).query(query);
        self.execute(operation, request).await
    }

    /// `POST <endpoint>` with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<ScriptEnvelope, GatewayError> {
        debug!(operation, endpoint = %self.endpoint, "POST");
        let request = self.http.post(&self.endpoint).json(body);
        self.execute(operation, request).await
    }

    async fn execute(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<ScriptEnvelope, GatewayError> {
        let timer = RequestTimer::new(operation);
        let result = self.send(request).await;
        timer.finish(match &result {
            Ok(_) => "success",
            Err(GatewayError::BackendRejected(_)) => "rejected",
            Err(GatewayError::ParseFailure(_)) => "parse_error",
            Err(_) => "network_error",
        });
        if let Err(e) = &result {
            warn!(operation, endpoint = %self.endpoint, error = %e, "Backend request failed");
        }
        result
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ScriptEnvelope, GatewayError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::NetworkFailure(format!(
                "backend returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let envelope: ScriptEnvelope = serde_json::from_str(&body)
            .map_err(|e| GatewayError::ParseFailure(format!("response is not valid JSON: {}", e)))?;

        if !envelope.success {
            return Err(GatewayError::BackendRejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request failed without a message".to_string()),
            ));
        }
        Ok(envelope)
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::NetworkFailure(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            GatewayError::NetworkFailure(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ScriptClient {
        ScriptClient::new(server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_get_passes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("school", "대건고"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": []
            })))
            .mount(&server)
            .await;

        let envelope = client(&server)
            .get("fetch_items", &[("school", "대건고")])
            .await
            .unwrap();
        assert!(envelope.success);
    }

    #[tokio::test]
    async fn test_post_sends_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "action": "deleteSchool", "code": "DG2024" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .post("delete_school", &json!({ "action": "deleteSchool", "code": "DG2024" }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_success_false_is_backend_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "해당 항목을 찾을 수 없습니다."
            })))
            .mount(&server)
            .await;

        let err = client(&server).post("update_item", &json!({})).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::BackendRejected("해당 항목을 찾을 수 없습니다.".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_json_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = client(&server).get("fetch_items", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::ParseFailure(_)));
    }

    #[tokio::test]
    async fn test_http_error_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).get("fetch_items", &[]).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::NetworkFailure("backend returned HTTP 500".to_string())
        );
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let slow = ScriptClient::new(server.uri(), Duration::from_millis(50)).unwrap();
        let err = slow.get("fetch_items", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::NetworkFailure(msg) if msg.contains("timed out")));
    }
}
