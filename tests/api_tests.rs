use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use brewpress::api::AppState;
use brewpress::config::Config;
use http_body_util::BodyExt;
use sea_orm::ConnectionTrait;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "correct-horse-battery";

async fn spawn_app() -> (Arc<AppState>, Router, String) {
    let db_path =
        std::env::temp_dir().join(format!("brewpress-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = "api-test-secret-0123456789".to_string();
    config.security.bcrypt_cost = 4;
    config.bootstrap.admin_email = ADMIN_EMAIL.to_string();
    config.bootstrap.admin_password = ADMIN_PASSWORD.to_string();

    let state = brewpress::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    state
        .auth_service()
        .ensure_bootstrap_admin(&state.config().bootstrap)
        .await
        .expect("failed to bootstrap admin");

    let router = brewpress::api::router(state.clone());

    let login = state
        .auth_service()
        .login(ADMIN_EMAIL, ADMIN_PASSWORD, None)
        .await
        .expect("admin login failed");

    (state, router, login.token)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_update_and_read_content() {
    let (_state, app, token) = spawn_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/admin/content",
        Some(&token),
        Some(json!({
            "hero": { "heading": "Fresh Coffee", "subtitle": "Roasted weekly" },
            "coffee": { "light_roast_price": 16.5, "featured": true }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 4);
    assert_eq!(body["data"]["failed"], 0);

    let (status, body) = send(&app, "GET", "/api/website/content/hero", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["heading"], "Fresh Coffee");

    let (_, body) = send(&app, "GET", "/api/website/content", None, None).await;
    assert_eq!(body["data"]["coffee"]["light_roast_price"], "16.5");
    assert_eq!(body["data"]["coffee"]["featured"], "true");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/admin/content/hero",
        Some(&token),
        Some(json!({ "heading": "New Heading", "subtitle": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 2);

    let (_, body) = send(&app, "GET", "/api/admin/content/hero", Some(&token), None).await;
    assert_eq!(body["data"], json!({ "heading": "New Heading" }));
}

#[tokio::test]
async fn test_content_writes_require_auth() {
    let (_state, app, _token) = spawn_app().await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/admin/content",
        None,
        Some(json!({ "hero": { "heading": "Nope" } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/website/content/hero", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_content_is_rejected_whole() {
    let (state, app, token) = spawn_app().await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/admin/content",
        Some(&token),
        Some(json!({ "about": { "title": "Ok" }, "hero": "not an object" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut content = json!({ "about": { "title": "Ok" } });
    content["s".repeat(101)] = json!({ "title": "x" });
    let (status, _) = send(&app, "PUT", "/api/admin/content", Some(&token), Some(content)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(state.store().get_all_content().await.unwrap().is_empty());

    let request = Request::builder()
        .method("PUT")
        .uri("/api/admin/content")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unusable_field_names_do_not_block_batch() {
    let (state, app, token) = spawn_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/admin/content",
        Some(&token),
        Some(json!({
            "contact": { "phone": "555", "Hours (weekend)": "9-5", "": "dropped" },
            "hero": { "heading": "Hi" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 3);
    assert_eq!(body["data"]["failed"], 1);

    let contact = state.store().get_content_section("contact").await.unwrap();
    assert_eq!(contact["Hours (weekend)"], "9-5");
    assert_eq!(contact["phone"], "555");
    assert_eq!(contact.len(), 2);

    let (status, body) = send(&app, "GET", "/api/website/content/hero", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["heading"], "Hi");
}

#[tokio::test]
async fn test_failed_row_does_not_abort_write() {
    let (state, app, token) = spawn_app().await;

    state
        .store()
        .conn
        .execute_unprepared(
            "CREATE TRIGGER reject_price BEFORE INSERT ON website_content \
             WHEN NEW.field = 'price' \
             BEGIN SELECT RAISE(ABORT, 'price is managed elsewhere'); END",
        )
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/admin/content/coffee",
        Some(&token),
        Some(json!({ "name": "Dark Roast", "price": "$18.99", "roast": "dark" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 2);
    assert_eq!(body["data"]["failed"], 1);

    let (_, body) = send(&app, "GET", "/api/admin/content/coffee", Some(&token), None).await;
    assert_eq!(body["data"], json!({ "name": "Dark Roast", "roast": "dark" }));
}

#[tokio::test]
async fn test_list_sections() {
    let (_state, app, token) = spawn_app().await;

    send(
        &app,
        "PUT",
        "/api/admin/content",
        Some(&token),
        Some(json!({
            "hero": { "heading": "H" },
            "about": { "title": "T" },
            "contact": { "phone": null }
        })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/admin/sections", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["about", "hero"]));

    let (status, _) = send(&app, "GET", "/api/admin/sections", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_section_is_not_found_publicly() {
    let (_state, app, token) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/website/content/menu", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, "GET", "/api/admin/content/menu", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn test_export_then_import_is_idempotent() {
    let (state, app, token) = spawn_app().await;

    send(
        &app,
        "PUT",
        "/api/admin/content",
        Some(&token),
        Some(json!({
            "about": { "title": "Our Story", "story1": "It began with a roaster." },
            "contact": { "phone": "(555) 555-0123" }
        })),
    )
    .await;

    let before = state.store().get_all_content().await.unwrap();

    let request = Request::builder()
        .uri("/api/admin/export")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"website-content-export.json\""
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let document: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(document["version"], "1.0.0");
    assert!(document["exportDate"].is_string());
    assert_eq!(document["content"]["about"]["title"], "Our Story");

    let (status, body) = send(&app, "POST", "/api/admin/import", Some(&token), Some(document)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 3);

    let after = state.store().get_all_content().await.unwrap();
    assert_eq!(before, after);
    assert_eq!(
        state.store().count_content_rows("about", "title").await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_import_rejects_unknown_version() {
    let (_state, app, token) = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/import",
        Some(&token),
        Some(json!({ "version": "2.0.0", "content": { "hero": { "heading": "x" } } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/import",
        Some(&token),
        Some(json!({ "version": "1.0.0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard() {
    let (_state, app, token) = spawn_app().await;

    send(
        &app,
        "PUT",
        "/api/admin/content",
        Some(&token),
        Some(json!({
            "hero": { "heading": "H", "button": "B" },
            "about": { "title": "T" }
        })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/admin/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_content"], 3);
    assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["recent_updates"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_search() {
    let (_state, app, token) = spawn_app().await;

    send(
        &app,
        "PUT",
        "/api/admin/content",
        Some(&token),
        Some(json!({
            "coffee": { "dark_roast_title": "Dark Roast", "dark_roast_price": "$18.99" },
            "features": { "feature2_title": "Fresh Roasted" }
        })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/website/search?q=roast", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_results"], 2);
    assert_eq!(body["data"]["results"]["coffee"][0]["field"], "dark_roast_title");

    let (status, _) = send(&app, "GET", "/api/website/search?q=%20a%20", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for wildcard in ["%25%25", "__"] {
        let uri = format!("/api/website/search?q={wildcard}");
        let (status, body) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_results"], 0);
    }
}

#[tokio::test]
async fn test_image_metadata_lifecycle() {
    let (state, app, token) = spawn_app().await;

    let record = json!({
        "filename": "logo-1700000000.png",
        "originalName": "logo.png",
        "path": "/uploads/logo-1700000000.png",
        "size": 2048,
        "mimetype": "image/png",
        "uploadedAt": "2026-01-01T09:00:00.000000Z",
        "section": "general",
        "field": "image"
    });
    let other = json!({
        "filename": "banner-1700000001.jpg",
        "originalName": "banner.jpg",
        "uploadedAt": "2026-01-01T08:00:00.000000Z",
        "section": "general",
        "field": "banner"
    });
    state
        .store()
        .upsert_content("images", "image", Some(&record.to_string()))
        .await
        .unwrap();
    state
        .store()
        .upsert_content("images", "banner", Some(&other.to_string()))
        .await
        .unwrap();

    let (_, body) = send(&app, "GET", "/api/website/content", None, None).await;
    assert_eq!(body["data"]["images"][0]["originalName"], "logo.png");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/admin/images/image",
        Some(&token),
        Some(json!({ "section": "hero" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/admin/images/logo-1700000000.png",
        Some(&token),
        Some(json!({ "section": "hero", "field": "background" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["section"], "hero");
    assert_eq!(body["data"]["size"], 2048);

    let (_, body) = send(&app, "GET", "/api/admin/images/section/hero", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["filename"], "logo-1700000000.png");

    let images = state.store().get_content_section("images").await.unwrap();
    assert_eq!(images.len(), 2);
    assert!(images["image"].contains("\"section\":\"hero\""));

    let (_, body) = send(&app, "GET", "/api/website/images?section=general", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["filename"], "banner-1700000001.jpg");

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/admin/images/logo-1700000000.png",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/admin/images", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["filename"], "banner-1700000001.jpg");

    let images = state.store().get_content_section("images").await.unwrap();
    assert!(!images.contains_key("image"));

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/admin/images/logo-1700000000.png",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/admin/images/missing.png",
        Some(&token),
        Some(json!({ "section": "hero" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
