//! Router tests, driven through `tower::ServiceExt::oneshot`

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pagewright_workspace::{router, AppState, FileSettingsStore, MediaLibrary};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct Fixture {
    dir: TempDir,
    app: Router,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSettingsStore::in_dir(dir.path().join("data"))
        .with_stylesheet(dir.path().join("public/theme.css"));
    let media = MediaLibrary::new(dir.path().join("media"));
    let app = router(AppState::new(store, media));
    Fixture { dir, app }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_settings_round_trip_through_http() {
    let fixture = fixture();

    let (status, body) = send(&fixture.app, Request::get("/api/settings").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sections"], json!([]));

    let saved = json!({
        "sections": [{
            "id": "hero-1",
            "type": "hero",
            "settings": { "title": "Spring sale" },
            "isVisible": true
        }],
        "styles": { "branding": { "colorScheme": "dark" }, "colorScheme": "dark" }
    });
    let (status, body) = send(&fixture.app, post_json("/api/settings", saved)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sections"], 1);

    let (_, body) = send(&fixture.app, Request::get("/api/settings").body(Body::empty()).unwrap()).await;
    assert_eq!(body["sections"][0]["settings"]["title"], "Spring sale");
    assert_eq!(body["styles"]["colorScheme"], "dark");
}

#[tokio::test]
async fn test_stylesheet_is_regenerated_on_disk() {
    let fixture = fixture();

    let styles = json!({
        "typography": { "headingFont": "Fraunces" },
        "customStyle": { "css": "footer { opacity: .8; }" }
    });
    let (status, body) = send(&fixture.app, post_json("/api/stylesheet", styles)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["stylesheet"].as_str().unwrap().ends_with("theme.css"));

    let css = std::fs::read_to_string(fixture.dir.path().join("public/theme.css")).unwrap();
    assert!(css.contains("--typography-heading-font: Fraunces;"));
    assert!(css.contains("footer { opacity: .8; }"));
}

#[tokio::test]
async fn test_media_upload_is_stored_and_served() {
    let fixture = fixture();

    let upload = Request::post("/api/media?filename=Team%20Photo.png")
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(&b"\x89PNG\r\n"[..]))
        .unwrap();
    let (status, body) = send(&fixture.app, upload).await;

    assert_eq!(status, StatusCode::CREATED);
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/"));
    assert!(url.ends_with("-team-photo.png"));

    let response = fixture
        .app
        .clone()
        .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"\x89PNG\r\n");
}

#[tokio::test]
async fn test_media_upload_rejects_disallowed_types() {
    let fixture = fixture();

    let upload = Request::post("/api/media?filename=setup.exe")
        .header(header::CONTENT_TYPE, "application/x-msdownload")
        .body(Body::from("MZ"))
        .unwrap();
    let (status, body) = send(&fixture.app, upload).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);
    assert!(!fixture.dir.path().join("media").exists());
}

#[tokio::test]
async fn test_corrupt_settings_file_is_a_server_error() {
    let fixture = fixture();
    std::fs::create_dir_all(fixture.dir.path().join("data")).unwrap();
    std::fs::write(fixture.dir.path().join("data/settings.json"), "[").unwrap();

    let (status, body) = send(&fixture.app, Request::get("/api/settings").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Invalid settings data"));
}
