//! Common test utilities for wallpaper-dl integration tests

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use wallpaper_dl::{Config, Event};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bytes every mocked image responds with
pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-payload";

/// Listing hit pointing its full-size URL at the mock server
pub fn hit(server: &MockServer, id: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "type": "photo",
        "tags": "mountain, lake, sky",
        "webformatURL": format!("{}/images/{id}_640.jpg", server.uri()),
        "largeImageURL": format!("{}/images/{id}_1280.jpg", server.uri()),
        "user": "photographer",
    })
}

/// Serve `ids` as listing page `page`
pub async fn mount_page(server: &MockServer, page: u32, ids: std::ops::Range<u64>) {
    let hits: Vec<_> = ids.map(|id| hit(server, id)).collect();
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("key", "integration-key"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 1000,
            "totalHits": 500,
            "hits": hits,
        })))
        .mount(server)
        .await;
}

/// Serve [`IMAGE_BYTES`] for every full-size image
pub async fn mount_images(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/images/\d+_1280\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(IMAGE_BYTES))
        .mount(server)
        .await;
}

/// Config pointing the catalog at `server` and storage into `root`
pub fn config_for(server: &MockServer, root: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = format!("{}/api/", server.uri());
    config.catalog.api_key = Some("integration-key".to_string());
    config.catalog.page_size = 5;
    config.storage.document_dir = root.join("documents");
    config.storage.library_dir = root.join("library");
    config.storage.database_path = root.join("library").join("library.db");
    config
}

/// Collect events until `done` matches one, or the timeout elapses
pub async fn collect_until(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    done: impl Fn(&Event) -> bool,
) -> Vec<Event> {
    let mut seen = Vec::new();
    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let finished = done(&event);
            seen.push(event);
            if finished {
                break;
            }
        }
    })
    .await;
    seen
}
