//! End-to-end browse and download flow
//!
//! Runs a real [`WallpaperBrowser`] against a mocked listing endpoint and
//! image host, saving into a SQLite-backed media library in a temp dir.
//!
//! # Running the tests
//!
//! ```bash
//! cargo test --test browse_flow
//! ```

mod common;

use common::{IMAGE_BYTES, collect_until, config_for, mount_images, mount_page};
use std::time::Duration;
use tempfile::TempDir;
use wallpaper_dl::{
    DownloadStatus, Error, Event, FetchFailureKind, ItemId, LoadOutcome, MediaLibrary, NoticeKind,
    WallpaperBrowser,
};
use wiremock::MockServer;

async fn browser_for(server: &MockServer) -> (WallpaperBrowser, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let browser = WallpaperBrowser::new(config_for(server, dir.path()))
        .await
        .unwrap();
    (browser, dir)
}

#[tokio::test]
async fn pages_are_appended_in_order_and_missing_pages_degrade() {
    let server = MockServer::start().await;
    mount_page(&server, 1, 100..105).await;
    mount_page(&server, 2, 200..205).await;
    let (browser, _dir) = browser_for(&server).await;

    browser.load_next().await;
    browser.load_next().await;
    let third = browser.load_next().await;

    // No mock for page 3: the listing answers 404 and the page counts as empty
    match third {
        LoadOutcome::Loaded(report) => {
            assert_eq!(report.page, 3);
            assert_eq!(report.added, 0);
            assert_eq!(report.failure, Some(FetchFailureKind::Status(404)));
        }
        LoadOutcome::Busy => panic!("sequential loads must not be busy"),
    }

    let state = browser.snapshot().pagination;
    let ids: Vec<u64> = state.items.iter().map(|i| i.id.get()).collect();
    assert_eq!(ids, vec![100, 101, 102, 103, 104, 200, 201, 202, 203, 204]);
    assert_eq!(state.next_page, 4);
    assert!(!state.is_loading);

    browser.refresh().await;
    let state = browser.snapshot().pagination;
    assert_eq!(state.items.len(), 5);
    assert_eq!(state.items[0].id, ItemId(100));
    assert_eq!(state.next_page, 2);
}

#[tokio::test]
async fn selected_wallpaper_is_saved_into_the_collection() {
    let server = MockServer::start().await;
    mount_page(&server, 1, 10..15).await;
    mount_images(&server).await;
    let (browser, dir) = browser_for(&server).await;
    let mut events = browser.subscribe();

    browser.load_next().await;
    let item = browser.select_by_id(ItemId(12)).unwrap();
    let saved = browser.start_download(item).await.unwrap();

    assert_eq!(saved.item_id, ItemId(12));
    assert_eq!(saved.collection, "Wallpapers");
    assert_eq!(std::fs::read(&saved.asset.path).unwrap(), IMAGE_BYTES);

    let download = browser.snapshot().download;
    assert_eq!(download.status, DownloadStatus::Succeeded);
    assert_eq!(download.fraction_complete, 1.0);
    assert!(browser.selected().is_none(), "success dismisses the detail view");

    // The transfer landed in the document dir before being moved into the library
    let staged = dir.path().join("documents").join("wallpaper_12.jpg");
    assert!(!staged.with_extension("jpg.part").exists());

    let seen = collect_until(&mut events, Duration::from_secs(5), |e| {
        matches!(e, Event::SelectionChanged { item_id: None })
    })
    .await;
    assert!(seen.iter().any(|e| matches!(
        e,
        Event::DownloadSucceeded { item_id, collection, .. }
            if *item_id == ItemId(12) && collection == "Wallpapers"
    )));
    assert!(seen.iter().any(|e| matches!(
        e,
        Event::Notice { notice } if notice.kind == NoticeKind::Success
    )));

    browser.shutdown().await.unwrap();

    let library = MediaLibrary::new(
        &dir.path().join("library").join("library.db"),
        &dir.path().join("library"),
        true,
    )
    .await
    .unwrap();
    let members = library.collection_assets("Wallpapers").await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, saved.asset.id);
}

#[tokio::test]
async fn unreachable_image_fails_without_saving() {
    let server = MockServer::start().await;
    mount_page(&server, 1, 1..3).await;
    // No image mock: the host answers 404 and the transfer yields no file
    let (browser, _dir) = browser_for(&server).await;

    browser.load_next().await;
    let item = browser.select_by_id(ItemId(1)).unwrap();
    let err = browser.start_download(item).await.unwrap_err();

    assert!(matches!(err, Error::Download(_)), "got {err:?}");
    let download = browser.snapshot().download;
    assert_eq!(download.status, DownloadStatus::Failed);
    assert!(browser.selected().is_none());
}

#[tokio::test]
async fn denied_library_access_makes_no_request() {
    let server = MockServer::start().await;
    mount_page(&server, 1, 1..3).await;
    mount_images(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, dir.path());
    config.storage.grant_access = false;
    let browser = WallpaperBrowser::new(config).await.unwrap();

    browser.load_next().await;
    let item = browser.select_by_id(ItemId(2)).unwrap();
    let err = browser.start_download(item).await.unwrap_err();

    assert!(matches!(err, Error::Download(_)), "got {err:?}");
    assert_eq!(browser.snapshot().download.fraction_complete, 0.0);

    let image_requests = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path().starts_with("/images/"))
        .count();
    assert_eq!(image_requests, 0);
}
