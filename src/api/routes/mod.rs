//! Route handlers for the HTTP bridge
//!
//! Handlers are organized by domain:
//! - [`catalog`] - Item list and paging
//! - [`selection`] - Detail-view selection
//! - [`download`] - The single download slot
//! - [`system`] - Health, config, events, OpenAPI, shutdown

use crate::types::ItemId;
use serde::{Deserialize, Serialize};

mod catalog;
mod download;
mod selection;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use catalog::*;
pub use download::*;
pub use selection::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for PUT /selection
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SelectRequest {
    /// Id of a loaded item
    pub id: ItemId,
}

/// Request body for POST /download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadRequest {
    /// Item to download; the current selection when omitted
    #[serde(default)]
    pub id: Option<ItemId>,
}

/// Response body for POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadAccepted {
    /// Item whose download started
    pub item_id: ItemId,
}
