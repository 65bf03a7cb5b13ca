//! HTTP presentation bridge
//!
//! Exposes a [`WallpaperBrowser`] to an out-of-process UI: snapshots as JSON,
//! user intents as commands, and the event bus as server-sent events.

use crate::{Result, WallpaperBrowser};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Catalog
/// - `GET /items` - Loaded items, cursor and loading flag
/// - `POST /items/next` - Load the next page (409 while a load is in flight)
/// - `POST /items/refresh` - Replace the list with a fresh first page
///
/// ## Selection
/// - `GET /selection` - Detail-viewed item (or null)
/// - `PUT /selection` - Select a loaded item by id
/// - `DELETE /selection` - Dismiss the detail view
///
/// ## Download
/// - `GET /download` - Download slot state
/// - `POST /download` - Start downloading an item (defaults to the selection)
/// - `DELETE /download` - Cancel the active download
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /config` - Current config (credential redacted)
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
/// - `POST /shutdown` - Graceful shutdown
pub fn create_router(browser: Arc<WallpaperBrowser>) -> Router {
    let config = browser.config().api.clone();
    let state = AppState::new(browser);

    let router = Router::new()
        // Catalog
        .route("/items", get(routes::list_items))
        .route("/items/next", post(routes::load_next_page))
        .route("/items/refresh", post(routes::refresh_items))
        // Selection
        .route(
            "/selection",
            get(routes::get_selection)
                .put(routes::select_item)
                .delete(routes::clear_selection),
        )
        // Download
        .route(
            "/download",
            get(routes::get_download)
                .post(routes::start_download)
                .delete(routes::cancel_download),
        )
        // System
        .route("/health", get(routes::health_check))
        .route("/config", get(routes::get_config))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream))
        .route("/shutdown", post(routes::shutdown));

    let router = if config.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api/v1/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    if config.cors_enabled {
        router.layer(build_cors_layer(&config.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins that parse as header values are allowed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server stops.
///
/// # Example
///
/// ```no_run
/// use wallpaper_dl::{Config, WallpaperBrowser};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let browser = Arc::new(WallpaperBrowser::new(Config::default()).await?);
///
/// // Start API server (blocks until shutdown)
/// wallpaper_dl::api::start_api_server(browser).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(browser: Arc<WallpaperBrowser>) -> Result<()> {
    let bind_address = browser.config().api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(browser);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
