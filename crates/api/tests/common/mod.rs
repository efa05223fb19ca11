//! Common test utilities for integration tests.
//!
//! Every app here runs against demo storage in a fresh in-memory store,
//! unless a test points the backend at a mock server.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use edukit_manager_api::{
    app::{create_app, AppState},
    config::Config,
};
use persistence::MemoryStore;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

/// Test configuration with the given overrides on top of the defaults.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    Config::load_for_test(overrides).expect("Failed to load test config")
}

pub async fn spawn_app(overrides: &[(&str, &str)]) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::connect(test_config(overrides), store.clone())
        .await
        .expect("Failed to build app state");
    TestApp {
        router: create_app(state.clone()),
        state,
        store,
    }
}

/// An admin session over the demo schools.
pub async fn admin_app() -> TestApp {
    spawn_app(&[]).await
}

/// A session for the first demo school (대건고, code DEMO001).
pub async fn school_app() -> TestApp {
    spawn_app(&[("session.kind", "school"), ("session.school_code", "DEMO001")]).await
}

impl TestApp {
    /// Sends one request and returns the status with the decoded JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Waits for background location writes.
    pub async fn flush_locations(&self) {
        if let Some(store) = &self.state.locations {
            store.lock().await.flush().await;
        }
    }
}
