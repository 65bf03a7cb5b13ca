//! Error types for wallpaper-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Download, Database, Config, etc.)
//! - HTTP status code mapping for the presentation bridge
//! - Structured error responses with machine-readable error codes

use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for wallpaper-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wallpaper-dl
///
/// Each variant carries enough context to diagnose the failure without
/// reaching back into the call site.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "catalog.page_size")
        key: Option<String>,
    },

    /// A caller-supplied argument violated an input constraint
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL (credential stripped)
        url: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Media library database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Media store rejected an operation
    #[error("media store error: {0}")]
    MediaStore(String),

    /// Requested catalog item or resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Media library database errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The platform refused storage-write authorization
    #[error("storage permission denied for item {id}")]
    PermissionDenied {
        /// The item whose download was refused
        id: ItemId,
    },

    /// Another download already owns the single active slot
    #[error("download of item {active} already in progress")]
    Busy {
        /// The item currently being downloaded
        active: ItemId,
    },

    /// The transfer finished without producing a file
    #[error("transfer of item {id} returned no result")]
    NoResult {
        /// The item whose transfer produced nothing
        id: ItemId,
    },

    /// Registering the file in the media store failed
    #[error("failed to save item {id} to the media library: {reason}")]
    Registration {
        /// The item that could not be registered
        id: ItemId,
        /// The reason registration failed
        reason: String,
    },

    /// The download was cancelled before it finished
    #[error("download of item {id} was cancelled")]
    Cancelled {
        /// The cancelled item
        id: ItemId,
    },

    /// No download is active to act on
    #[error("no download in progress")]
    NoActiveDownload,
}

/// API error response format
///
/// Returned by bridge endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "download_busy",
///     "message": "download error: download of item 7 already in progress",
///     "details": {
///       "active_item_id": 7
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "download_busy")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::InvalidArgument(_) => 400,

            Error::NotFound(_) => 404,
            Error::Database(DatabaseError::NotFound(_)) => 404,

            Error::Download(DownloadError::Busy { .. }) => 409,
            Error::Download(DownloadError::NoActiveDownload) => 409,

            Error::Download(DownloadError::PermissionDenied { .. }) => 403,
            Error::Download(DownloadError::Registration { .. }) => 422,
            Error::Download(DownloadError::Cancelled { .. }) => 409,

            Error::Network(_) => 502,
            Error::Http { .. } => 502,
            Error::Download(DownloadError::NoResult { .. }) => 502,

            Error::ShuttingDown => 503,

            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Database(_) => 500,
            Error::MediaStore(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::Network(_) => "network_error",
            Error::Http { .. } => "http_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Sqlx(_) => "database_error",
            Error::Database(DatabaseError::NotFound(_)) => "record_not_found",
            Error::Database(_) => "database_error",
            Error::Download(e) => match e {
                DownloadError::PermissionDenied { .. } => "permission_denied",
                DownloadError::Busy { .. } => "download_busy",
                DownloadError::NoResult { .. } => "no_result",
                DownloadError::Registration { .. } => "registration_failed",
                DownloadError::Cancelled { .. } => "cancelled",
                DownloadError::NoActiveDownload => "no_active_download",
            },
            Error::MediaStore(_) => "media_store_error",
            Error::NotFound(_) => "not_found",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Download(DownloadError::Busy { active }) => Some(serde_json::json!({
                "active_item_id": active,
            })),
            Error::Download(
                DownloadError::PermissionDenied { id }
                | DownloadError::NoResult { id }
                | DownloadError::Cancelled { id },
            ) => Some(serde_json::json!({
                "item_id": id,
            })),
            Error::Download(DownloadError::Registration { id, reason }) => {
                Some(serde_json::json!({
                    "item_id": id,
                    "reason": reason,
                }))
            }
            Error::Http { status, url } => Some(serde_json::json!({
                "upstream_status": status,
                "url": url,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
