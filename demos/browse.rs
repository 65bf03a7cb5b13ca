//! Browse and download example
//!
//! This example demonstrates the core functionality of wallpaper-dl:
//! - Creating a browser with the API key from `PIXABAY_API_KEY`
//! - Subscribing to events
//! - Loading the first catalog page
//! - Selecting an item and saving it to the media library
//! - Serving the HTTP bridge until Ctrl+C
//!
//! After the download, you can:
//! - View Swagger UI at http://localhost:6790/swagger-ui
//! - Load more items via POST http://localhost:6790/items/next
//! - Stream events via GET http://localhost:6790/events

use std::sync::Arc;
use wallpaper_dl::api::start_api_server;
use wallpaper_dl::{Config, Event, WallpaperBrowser, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let config = Config::from_env();
    if config.catalog.api_key.is_none() {
        eprintln!("Set PIXABAY_API_KEY to browse the live catalog");
    }

    let browser = WallpaperBrowser::new(config).await?;

    // Subscribe to events
    let mut events = browser.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::PageLoaded {
                    page,
                    added,
                    degraded,
                    ..
                } => {
                    if degraded {
                        println!("! Page {} could not be fetched", page);
                    } else {
                        println!("✓ Page {}: {} wallpapers", page, added);
                    }
                }
                Event::DownloadProgress {
                    item_id, fraction, ..
                } => {
                    println!("↓ #{}: {:.1}%", item_id, fraction * 100.0);
                }
                Event::Notice { notice } => {
                    println!("[{}] {}", notice.title, notice.message);
                }
                Event::Shutdown => {
                    println!("Shutting down");
                    break;
                }
                _ => {}
            }
        }
    });

    browser.load_next().await;

    let items = browser.snapshot().pagination.items;
    for item in items.iter().take(5) {
        println!("  #{} by {} ({})", item.id, item.owner, item.tags);
    }

    if let Some(item) = items.first().cloned() {
        browser.select(item.clone());
        match browser.start_download(item).await {
            Ok(saved) => println!(
                "Saved asset {} into '{}' at {}",
                saved.asset.id,
                saved.collection,
                saved.asset.path.display()
            ),
            Err(e) => println!("Download failed: {}", e),
        }
    }

    let address = browser.config().api.bind_address;
    println!();
    println!("📖 Swagger UI: http://{}/swagger-ui", address);
    println!("🔄 Events stream: http://{}/events", address);
    println!("Press Ctrl+C to stop");

    // The API server runs indefinitely; shutdown is driven by the signal handler
    let api_browser = Arc::new(browser.clone());
    tokio::spawn(async move {
        if let Err(e) = start_api_server(api_browser).await {
            eprintln!("API server error: {}", e);
        }
    });

    run_with_shutdown(browser).await?;

    Ok(())
}
