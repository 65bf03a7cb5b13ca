//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the wallpaper-dl HTTP bridge using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the wallpaper-dl HTTP bridge
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "wallpaper-dl HTTP API",
        version = "0.1.0",
        description = "Browse a paginated wallpaper catalog, select an item and save it into the media library",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790", description = "Local development server")
    ),
    paths(
        // Catalog
        crate::api::routes::list_items,
        crate::api::routes::load_next_page,
        crate::api::routes::refresh_items,

        // Selection
        crate::api::routes::get_selection,
        crate::api::routes::select_item,
        crate::api::routes::clear_selection,

        // Download
        crate::api::routes::get_download,
        crate::api::routes::start_download,
        crate::api::routes::cancel_download,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_config,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
        crate::api::routes::shutdown,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::ItemId,
        crate::types::CatalogItem,
        crate::types::CatalogPage,
        crate::types::FetchFailureKind,
        crate::types::PaginationState,
        crate::types::DownloadStatus,
        crate::types::DownloadState,
        crate::types::NoticeKind,
        crate::types::Notice,
        crate::types::Asset,
        crate::types::SavedWallpaper,
        crate::types::Event,
        crate::pagination::PageReport,
        crate::browser::BrowserSnapshot,
        crate::library::Collection,

        // Config types from config.rs
        crate::config::Config,
        crate::config::CatalogConfig,
        crate::config::StorageConfig,
        crate::config::DownloadConfig,
        crate::config::ApiConfig,

        // API request/response types
        crate::api::routes::SelectRequest,
        crate::api::routes::DownloadRequest,
        crate::api::routes::DownloadAccepted,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "catalog", description = "Item list and paging"),
        (name = "selection", description = "Detail-view selection"),
        (name = "download", description = "The single download slot"),
        (name = "system", description = "Health, config, events and lifecycle")
    )
)]
pub struct ApiDoc;
