//! # wallpaper-dl
//!
//! Event-driven core of a wallpaper browser: page through a remote photo
//! catalog, detail-view one item, and save it into a local media library.
//!
//! ## Design Philosophy
//!
//! wallpaper-dl is designed to be:
//! - **Library-first** - No UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events and watch snapshots
//! - **Fail-soft where it matters** - A flaky listing call degrades to an
//!   empty page; a failed download always lands back in a stable state
//! - **Sensible defaults** - Works with `Config::default()` plus an API key
//!
//! ## Quick Start
//!
//! ```no_run
//! use wallpaper_dl::{Config, WallpaperBrowser};
//! use wallpaper_dl::config::DEFAULT_API_KEY_VAR;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.catalog = config.catalog.with_api_key_from_env(DEFAULT_API_KEY_VAR);
//!
//!     let browser = WallpaperBrowser::new(config).await?;
//!
//!     // Subscribe to events
//!     let mut events = browser.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     browser.load_next().await;
//!     if let Some(item) = browser.snapshot().pagination.items.first().cloned() {
//!         browser.select(item.clone());
//!         browser.start_download(item).await?;
//!     }
//!
//!     browser.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP/SSE presentation bridge
pub mod api;
/// Browser facade wiring every controller together
pub mod browser;
/// Remote catalog listing
pub mod catalog;
/// Configuration types
pub mod config;
/// Single active download
pub mod download;
/// Error types
pub mod error;
/// SQLite-backed media library
pub mod library;
/// Paginated item list
pub mod pagination;
/// Detail-view selection
pub mod selection;
/// Core types and events
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use browser::{BrowserSnapshot, Collaborators, WallpaperBrowser};
pub use catalog::{CatalogSource, HttpCatalogClient, PageFetch};
pub use config::Config;
pub use download::{AccessStatus, DownloadController, HttpTransfer, MediaStore, Transfer};
pub use error::{ApiError, DatabaseError, DownloadError, Error, ErrorDetail, Result, ToHttpStatus};
pub use library::MediaLibrary;
pub use pagination::{LoadOutcome, PageReport, PaginationController};
pub use selection::SelectionState;
pub use types::{
    Asset, CatalogItem, CatalogPage, DownloadState, DownloadStatus, Event, FetchFailureKind,
    ItemId, Notice, NoticeKind, PaginationState, SavedWallpaper,
};

/// Helper function to run the browser with graceful signal handling.
///
/// Waits for a termination signal and then calls the browser's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use wallpaper_dl::{Config, WallpaperBrowser, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let browser = WallpaperBrowser::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(browser).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(browser: WallpaperBrowser) -> Result<()> {
    wait_for_signal().await;
    browser.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(term), Err(int)) => {
            tracing::error!(
                sigterm_error = %term,
                sigint_error = %int,
                "Could not register any signal handlers, using ctrl_c fallback"
            );
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
