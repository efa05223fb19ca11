//! Integration tests for an admin session over demo storage.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::admin_app;
use persistence::KeyValueStore;
use serde_json::json;
use tower::ServiceExt;

fn new_item(school: &str) -> serde_json::Value {
    json!({
        "name": "레고 스파이크 프라임",
        "categories": ["로봇", "키트"],
        "quantity": 3,
        "locations": ["과학실1/선반A-1칸"],
        "school": school
    })
}

#[tokio::test]
async fn test_health_reports_demo_admin() {
    let app = admin_app().await;
    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"]["demo_mode"], true);
    assert_eq!(body["backend"]["scope"], "admin");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = admin_app().await;
    let request = Request::builder()
        .uri("/api/health/live")
        .header("X-Request-ID", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_session_starts_on_all_schools() {
    let app = admin_app().await;
    let (status, body) = app.get("/api/v1/session").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["selectedSchool"], "모두");
    assert_eq!(body["knownSchools"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_all_schools_list_merges_every_demo_school() {
    let app = admin_app().await;

    let (_, items) = app.get("/api/v1/items").await;
    assert_eq!(items["count"], 48);

    let (_, all) = app.get("/api/v1/items/all").await;
    assert_eq!(all["count"], 48);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = admin_app().await;
    let (status, body) = app.get("/api/v1/items?q=hc-sr04").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 6);
    assert_eq!(body["items"][0]["name"], "초음파 센서 HC-SR04");
}

#[tokio::test]
async fn test_select_school_reloads_items_and_is_remembered() {
    let app = admin_app().await;
    let (status, body) = app
        .put("/api/v1/session/selection", json!({ "school": "신송고" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selectedSchool"], "신송고");
    assert_eq!(app.store.get("selected_school").as_deref(), Some("신송고"));

    let (_, items) = app.get("/api/v1/items").await;
    assert_eq!(items["count"], 8);
    assert!(items["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|i| i["school"] == "신송고"));

    let (_, all) = app.get("/api/v1/items/all").await;
    assert_eq!(all["count"], 48);
}

#[tokio::test]
async fn test_dashboard_follows_selection() {
    let app = admin_app().await;

    let (status, summary) = app.get("/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalItems"], 48);
    assert_eq!(summary["totalQuantity"], 696);
    assert_eq!(summary["lowStockCount"], 12);
    assert_eq!(summary["outOfStockCount"], 6);
    assert_eq!(summary["recentItems"].as_array().unwrap().len(), 5);

    app.put("/api/v1/session/selection", json!({ "school": "신송고" }))
        .await;
    let (_, summary) = app.get("/api/v1/dashboard").await;
    assert_eq!(summary["totalItems"], 8);
    assert_eq!(summary["totalQuantity"], 116);
}

#[tokio::test]
async fn test_dashboard_refresh() {
    let app = admin_app().await;
    let (status, summary) = app.post("/api/v1/dashboard/refresh", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalItems"], 48);
}

#[tokio::test]
async fn test_item_lifecycle() {
    let app = admin_app().await;

    let (status, created) = app.post("/api/v1/items", new_item("신송고")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["school"], "신송고");
    assert_eq!(created["category"], "로봇, 키트");
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 32);

    let (_, all) = app.get("/api/v1/items/all").await;
    assert_eq!(all["count"], 49);
    assert_eq!(all["items"][0]["id"], id.as_str());
    assert!(app.store.get("demo_items_신송고").is_some());

    let mut edited = created.clone();
    edited["quantity"] = json!(10);
    let (status, updated) = app.put(&format!("/api/v1/items/{}", id), edited).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 10);

    let (_, all) = app.get("/api/v1/items/all").await;
    assert_eq!(all["items"][0]["quantity"], 10);

    let (status, _) = app.delete(&format!("/api/v1/items/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, all) = app.get("/api/v1/items/all").await;
    assert_eq!(all["count"], 48);
}

#[tokio::test]
async fn test_create_without_school_uses_default() {
    let app = admin_app().await;
    let mut draft = new_item("");
    draft.as_object_mut().unwrap().remove("school");

    let (status, created) = app.post("/api/v1/items", draft).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["school"], "대건고");
}

#[tokio::test]
async fn test_invalid_draft_is_rejected_without_change() {
    let app = admin_app().await;
    let mut draft = new_item("신송고");
    draft["name"] = json!("  ");

    let (status, body) = app.post("/api/v1/items", draft).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, all) = app.get("/api/v1/items/all").await;
    assert_eq!(all["count"], 48);
}

#[tokio::test]
async fn test_location_report_groups_by_room() {
    let app = admin_app().await;
    let (status, report) = app.get("/api/v1/reports/locations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalItems"], 48);
    assert_eq!(report["totalQuantity"], 696);

    let rooms: Vec<&str> = report["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(rooms, vec!["과학실1", "과학실2", "창고"]);
    assert_eq!(report["rooms"][0]["itemCount"], 18);
}

#[tokio::test]
async fn test_school_only_routes_are_forbidden() {
    let app = admin_app().await;

    let (status, body) = app.get("/api/v1/locations").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app
        .put("/api/v1/categories", json!({ "categories": ["코딩"] }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, categories) = app.get("/api/v1/categories").await;
    assert_eq!(categories["categories"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_school_registry_crud() {
    let app = admin_app().await;

    let (status, schools) = app.get("/api/v1/admin/schools").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schools.as_array().unwrap().len(), 6);
    assert_eq!(schools[0]["code"], "DEMO001");

    let school = json!({ "name": "청라고", "code": "CHEONG1", "scriptUrl": "" });
    let (status, created) = app.post("/api/v1/admin/schools", school.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["code"], "CHEONG1");

    let (status, body) = app.post("/api/v1/admin/schools", school).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "이미 존재하는 학교 코드입니다.");

    let (status, updated) = app
        .put(
            "/api/v1/admin/schools/CHEONG1",
            json!({ "name": "청라고", "code": "CHEONG2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["code"], "CHEONG2");

    let (status, _) = app.delete("/api/v1/admin/schools/CHEONG2").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete("/api/v1/admin/schools/CHEONG2").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_school_code_is_validated() {
    let app = admin_app().await;
    let (status, body) = app
        .post(
            "/api/v1/admin/schools",
            json!({ "name": "청라고", "code": "a!", "scriptUrl": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_generate_code() {
    let app = admin_app().await;
    let (status, body) = app.get("/api/v1/admin/schools/generate-code").await;

    assert_eq!(status, StatusCode::OK);
    let code = body["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[tokio::test]
async fn test_admin_login_and_password_change() {
    let app = admin_app().await;

    let (status, body) = app
        .post(
            "/api/v1/admin/login",
            json!({ "username": "admin", "password": "admin123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app
        .post(
            "/api/v1/admin/login",
            json!({ "username": "admin", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "아이디 또는 비밀번호가 올바르지 않습니다.");

    let (status, _) = app
        .put(
            "/api/v1/admin/password",
            json!({ "username": "admin", "oldPassword": "admin123", "newPassword": "s3cret!" }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_image_upload_in_demo_returns_data_url() {
    let app = admin_app().await;

    let (status, body) = app
        .post(
            "/api/v1/images",
            json!({ "dataUrl": "data:image/png;base64,YWJj", "fileName": "kit.png" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["url"], "data:image/png;base64,YWJj");

    let (status, _) = app
        .post(
            "/api/v1/images",
            json!({ "dataUrl": "data:application/pdf;base64,JVBE", "fileName": "a.pdf" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/images",
            json!({ "dataUrl": "https://example.com/a.png", "fileName": "a.png" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
