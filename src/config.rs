//! Configuration types for wallpaper-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Environment variable consulted by [`CatalogConfig::with_api_key_from_env`]
pub const DEFAULT_API_KEY_VAR: &str = "PIXABAY_API_KEY";

/// Remote listing endpoint settings
///
/// The filter parameters are sent verbatim on every listing request.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogConfig {
    /// Listing endpoint (default: "https://pixabay.com/api/")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static access credential, sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// Items requested per page (default: 20)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// `image_type` filter (default: "photo")
    #[serde(default = "default_image_type")]
    pub image_type: String,

    /// `orientation` filter (default: "vertical")
    #[serde(default = "default_orientation")]
    pub orientation: String,

    /// `category` filter (default: "backgrounds")
    #[serde(default = "default_category")]
    pub category: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,

    /// User-Agent header for listing and image requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            page_size: default_page_size(),
            image_type: default_image_type(),
            orientation: default_orientation(),
            category: default_category(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl CatalogConfig {
    /// Fill `api_key` from an environment variable when it is set and non-empty.
    ///
    /// An already configured key is replaced; an absent variable leaves it untouched.
    pub fn with_api_key_from_env(mut self, var: &str) -> Self {
        if let Ok(key) = std::env::var(var)
            && !key.trim().is_empty()
        {
            self.api_key = Some(key);
        }
        self
    }
}

/// Local storage and media library settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Per-install document directory where transfers land (default: "./documents")
    #[serde(default = "default_document_dir")]
    pub document_dir: PathBuf,

    /// Media library root (default: "./library")
    #[serde(default = "default_library_dir")]
    pub library_dir: PathBuf,

    /// Media library catalog database (default: "./library/media.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Collection every saved wallpaper is grouped into (default: "Wallpapers")
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Prefix of downloaded file names (default: "wallpaper_")
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Extension used when the image URL has none (default: "jpg")
    #[serde(default = "default_extension")]
    pub default_extension: String,

    /// Whether the media library grants write access (default: true)
    #[serde(default = "default_true")]
    pub grant_access: bool,

    /// Add a copy to the collection instead of moving the asset (default: false)
    #[serde(default)]
    pub copy_into_collection: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            document_dir: default_document_dir(),
            library_dir: default_library_dir(),
            database_path: default_database_path(),
            collection_name: default_collection_name(),
            file_prefix: default_file_prefix(),
            default_extension: default_extension(),
            grant_access: true,
            copy_into_collection: false,
        }
    }
}

/// Download behavior settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Continue from a leftover `.part` file with a range request (default: true)
    #[serde(default = "default_true")]
    pub resume_partial: bool,

    /// Capacity of the event broadcast channel (default: 1000)
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            resume_partial: true,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// HTTP bridge settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed origins; "*" allows any (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for [`WallpaperBrowser`](crate::WallpaperBrowser)
///
/// Every field has a default, so `Config::default()` plus an API key is a
/// working setup.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Remote listing endpoint
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Local storage and media library
    #[serde(default)]
    pub storage: StorageConfig,

    /// Download behavior
    #[serde(default)]
    pub download: DownloadConfig,

    /// HTTP bridge
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Default configuration with the API key read from `PIXABAY_API_KEY`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.catalog = config.catalog.with_api_key_from_env(DEFAULT_API_KEY_VAR);
        config
    }

    /// Check the settings the controllers rely on
    pub fn validate(&self) -> Result<()> {
        if self.catalog.page_size == 0 {
            return Err(invalid("catalog.page_size", "page size must be at least 1"));
        }
        if let Err(e) = url::Url::parse(&self.catalog.base_url) {
            return Err(invalid(
                "catalog.base_url",
                format!("'{}' is not a valid URL: {}", self.catalog.base_url, e),
            ));
        }
        if self.storage.collection_name.trim().is_empty() {
            return Err(invalid(
                "storage.collection_name",
                "collection name must not be empty",
            ));
        }
        if self.download.event_channel_capacity == 0 {
            return Err(invalid(
                "download.event_channel_capacity",
                "event channel capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

fn default_base_url() -> String {
    "https://pixabay.com/api/".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_image_type() -> String {
    "photo".to_string()
}

fn default_orientation() -> String {
    "vertical".to_string()
}

fn default_category() -> String {
    "backgrounds".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("wallpaper-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_document_dir() -> PathBuf {
    PathBuf::from("./documents")
}

fn default_library_dir() -> PathBuf {
    PathBuf::from("./library")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./library/media.db")
}

fn default_collection_name() -> String {
    "Wallpapers".to_string()
}

fn default_file_prefix() -> String {
    "wallpaper_".to_string()
}

fn default_extension() -> String {
    "jpg".to_string()
}

fn default_true() -> bool {
    true
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
