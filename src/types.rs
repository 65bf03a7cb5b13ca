//! Core types for wallpaper-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Stable identifier of a catalog item
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// One remotely hosted image
///
/// Immutable once built; identity is [`CatalogItem::id`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogItem {
    /// Unique, stable identifier
    pub id: ItemId,
    /// Low-resolution rendition
    pub preview_url: String,
    /// High-resolution rendition (the one that gets downloaded)
    pub full_url: String,
    /// Display name of the uploader
    pub owner: String,
    /// Comma/space-delimited free text
    pub tags: String,
}

impl CatalogItem {
    /// Split the free-text tag field into individual tags.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Items produced by a single listing call
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogPage {
    /// Page index that produced these items (1-based)
    pub page: u32,
    /// Items in listing order
    pub items: Vec<CatalogItem>,
    /// Total matches reported by the listing endpoint, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hits: Option<u64>,
}

impl CatalogPage {
    /// A page with no items
    pub fn empty(page: u32) -> Self {
        Self {
            page,
            items: Vec::new(),
            total_hits: None,
        }
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Why a listing call degraded to an empty page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailureKind {
    /// Connection, TLS or timeout failure
    Transport,
    /// Endpoint answered with a non-success status
    Status(u16),
    /// Body did not decode as a listing response
    Decode,
    /// Page number or page size below 1; no request was made
    InvalidRequest,
}

/// Snapshot of the paginated item list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaginationState {
    /// All items loaded so far, in fetch order
    pub items: Vec<CatalogItem>,
    /// Page that the next `load_next` will request
    pub next_page: u32,
    /// Whether a fetch is in flight
    pub is_loading: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page: 1,
            is_loading: false,
        }
    }
}

/// Download lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadStatus {
    /// No download requested
    #[default]
    Idle,
    /// Bytes are being transferred or registered
    InProgress,
    /// Saved into the media library
    Succeeded,
    /// Ended without saving
    Failed,
}

/// Snapshot of the single download slot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DownloadState {
    /// Item being (or last) downloaded
    pub target: Option<CatalogItem>,
    /// Fraction of bytes written, 0.0 to 1.0
    pub fraction_complete: f64,
    /// Current status
    pub status: DownloadStatus,
    /// Bytes written so far, including any resumed prefix
    pub bytes_written: u64,
    /// Bytes expected in total (0 when unknown)
    pub bytes_expected: u64,
    /// Failure message when `status` is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadState {
    /// Whether the slot is mid-transfer
    pub fn is_in_progress(&self) -> bool {
        self.status == DownloadStatus::InProgress
    }
}

/// Category of a user-visible notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Operation finished as the user asked
    Success,
    /// Operation failed
    Error,
    /// Storage permission was refused
    PermissionNeeded,
    /// Operation was cancelled
    Cancelled,
}

/// A message meant to be shown to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    /// Notification category
    pub kind: NoticeKind,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
}

impl Notice {
    /// Storage permission was refused
    pub fn permission_needed() -> Self {
        Self {
            kind: NoticeKind::PermissionNeeded,
            title: "Permission needed".to_string(),
            message: "Please grant permission to save wallpapers.".to_string(),
        }
    }

    /// Download saved
    pub fn saved() -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success".to_string(),
            message: "Wallpaper saved to your photos!".to_string(),
        }
    }

    /// Transfer or registration failed
    pub fn download_failed() -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            message: "Failed to download wallpaper. Please try again.".to_string(),
        }
    }

    /// Download cancelled
    pub fn cancelled() -> Self {
        Self {
            kind: NoticeKind::Cancelled,
            title: "Cancelled".to_string(),
            message: "Download cancelled.".to_string(),
        }
    }
}

/// A file registered in the media library
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Asset {
    /// Library-assigned identifier
    pub id: i64,
    /// Current on-disk location
    #[schema(value_type = String)]
    pub path: PathBuf,
    /// When the asset was registered
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// Result of a successful download
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SavedWallpaper {
    /// Downloaded item
    pub item_id: ItemId,
    /// Asset that landed in the collection
    pub asset: Asset,
    /// Collection the asset was grouped into
    pub collection: String,
}

/// Event emitted by the browser
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A page was appended to the item list
    PageLoaded {
        /// Page number that was requested
        page: u32,
        /// Items appended
        added: usize,
        /// Items in the list afterwards
        total_items: usize,
        /// Whether the page degraded to empty because the fetch failed
        degraded: bool,
    },

    /// The item list was replaced with a fresh first page
    Refreshed {
        /// Items in the list afterwards
        total_items: usize,
        /// Whether the page degraded to empty because the fetch failed
        degraded: bool,
    },

    /// A listing call failed and was treated as an empty page
    PageFetchFailed {
        /// Page number that was requested
        page: u32,
        /// What went wrong
        kind: FetchFailureKind,
    },

    /// The detail-viewed item changed
    SelectionChanged {
        /// Newly selected item (None = detail view dismissed)
        item_id: Option<ItemId>,
    },

    /// A download passed the permission check and began transferring
    DownloadStarted {
        /// Item being downloaded
        item_id: ItemId,
    },

    /// Download progress update
    DownloadProgress {
        /// Item being downloaded
        item_id: ItemId,
        /// Fraction complete, 0.0 to 1.0
        fraction: f64,
        /// Bytes written so far
        bytes_written: u64,
        /// Bytes expected in total (0 when unknown)
        bytes_expected: u64,
    },

    /// Download saved into the media library
    DownloadSucceeded {
        /// Downloaded item
        item_id: ItemId,
        /// Library asset id
        asset_id: i64,
        /// Collection the asset was added to
        collection: String,
    },

    /// Download ended without saving
    DownloadFailed {
        /// Item that failed
        item_id: ItemId,
        /// Error message
        error: String,
    },

    /// Something the user should be told about
    Notice {
        /// The notification
        notice: Notice,
    },

    /// Browser is shutting down
    Shutdown,
}

impl Event {
    /// Short machine name of the event, used as the SSE event type
    pub fn name(&self) -> &'static str {
        match self {
            Event::PageLoaded { .. } => "page_loaded",
            Event::Refreshed { .. } => "refreshed",
            Event::PageFetchFailed { .. } => "page_fetch_failed",
            Event::SelectionChanged { .. } => "selection_changed",
            Event::DownloadStarted { .. } => "download_started",
            Event::DownloadProgress { .. } => "download_progress",
            Event::DownloadSucceeded { .. } => "download_succeeded",
            Event::DownloadFailed { .. } => "download_failed",
            Event::Notice { .. } => "notice",
            Event::Shutdown => "shutdown",
        }
    }
}
