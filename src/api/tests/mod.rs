use super::*;
use crate::browser::Collaborators;
use crate::test_helpers::{FakeMediaStore, FakeTransfer, ScriptedCatalog, sample_items, test_config};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

mod catalog;

/// Browser over scripted collaborators: page 1 holds items 1..=20, page 2 items 21..=40
fn test_browser(transfer: FakeTransfer) -> (Arc<WallpaperBrowser>, Arc<FakeTransfer>, TempDir) {
    test_browser_with(transfer, FakeMediaStore::granting(), |_| {})
}

fn test_browser_with(
    transfer: FakeTransfer,
    store: FakeMediaStore,
    configure: impl FnOnce(&mut crate::Config),
) -> (Arc<WallpaperBrowser>, Arc<FakeTransfer>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    configure(&mut config);

    let transfer = Arc::new(transfer);
    let browser = WallpaperBrowser::with_collaborators(
        config,
        Collaborators {
            catalog: Arc::new(
                ScriptedCatalog::new()
                    .with_page(1, sample_items(1, 20))
                    .with_page(2, sample_items(21, 20)),
            ),
            transfer: transfer.clone(),
            media_store: Arc::new(store),
        },
    )
    .unwrap();
    (Arc::new(browser), transfer, dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn api_server_spawns() {
    let (browser, _transfer, _dir) = test_browser_with(
        FakeTransfer::completing(b"x"),
        FakeMediaStore::granting(),
        |config| config.api.bind_address = "127.0.0.1:0".parse().unwrap(),
    );

    let api_handle = tokio::spawn(start_api_server(browser));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!api_handle.is_finished(), "server should keep running");
    api_handle.abort();
}

#[tokio::test]
async fn cors_headers_are_present_when_enabled() {
    let (browser, _transfer, _dir) = test_browser(FakeTransfer::completing(b"x"));
    let app = create_router(browser);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn cors_headers_are_absent_when_disabled() {
    let (browser, _transfer, _dir) = test_browser_with(
        FakeTransfer::completing(b"x"),
        FakeMediaStore::granting(),
        |config| config.api.cors_enabled = false,
    );
    let app = create_router(browser);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[test]
fn cors_layer_accepts_specific_origins() {
    // Builds without panicking for both forms
    let _any = build_cors_layer(&["*".to_string()]);
    let _listed = build_cors_layer(&[
        "http://localhost:3000".to_string(),
        "not a header\n".to_string(),
    ]);
}

#[tokio::test]
async fn swagger_ui_can_be_disabled() {
    let (browser, _transfer, _dir) = test_browser_with(
        FakeTransfer::completing(b"x"),
        FakeMediaStore::granting(),
        |config| config.api.swagger_ui = false,
    );
    let app = create_router(browser);

    let response = send(&app, "GET", "/swagger-ui/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
