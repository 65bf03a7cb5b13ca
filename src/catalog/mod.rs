//! Remote catalog listing
//!
//! [`CatalogSource`] is the strict request/response seam: it either yields a
//! page or an error. [`fetch_page`] is the fail-soft boundary the pagination
//! controller calls. It never returns an error; failures come back as
//! [`PageFetch::Failed`] so callers can tell a transient failure from an
//! honestly empty page, or collapse both with [`PageFetch::into_page`].

use crate::error::{Error, Result};
use crate::types::{CatalogPage, FetchFailureKind};
use async_trait::async_trait;
use tracing::{debug, warn};

pub mod http;

pub use http::HttpCatalogClient;

/// A paginated listing of catalog items
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of the listing.
    ///
    /// `page` and `per_page` are both 1-based and at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a body
    /// that does not decode as a listing.
    async fn list(&self, page: u32, per_page: u32) -> Result<CatalogPage>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Tagged outcome of a fail-soft listing call
#[derive(Clone, Debug, PartialEq)]
pub enum PageFetch {
    /// The listing answered (possibly with zero items)
    Loaded(CatalogPage),
    /// The listing failed and should be treated as empty
    Failed {
        /// Page number that was requested
        page: u32,
        /// What went wrong
        kind: FetchFailureKind,
    },
}

impl PageFetch {
    /// Failure kind, if the fetch degraded
    pub fn failure(&self) -> Option<FetchFailureKind> {
        match self {
            PageFetch::Loaded(_) => None,
            PageFetch::Failed { kind, .. } => Some(*kind),
        }
    }

    /// Collapse to a page, treating failures as empty
    pub fn into_page(self) -> CatalogPage {
        match self {
            PageFetch::Loaded(page) => page,
            PageFetch::Failed { page, .. } => CatalogPage::empty(page),
        }
    }
}

/// Fetch a page without propagating failures.
///
/// Input constraints are checked before any request is made. Every failure is
/// logged and reported as [`PageFetch::Failed`].
pub async fn fetch_page(source: &dyn CatalogSource, page: u32, per_page: u32) -> PageFetch {
    if page == 0 || per_page == 0 {
        warn!(
            page,
            per_page,
            source = source.name(),
            "Rejected listing request: page and page size must be at least 1"
        );
        return PageFetch::Failed {
            page,
            kind: FetchFailureKind::InvalidRequest,
        };
    }

    match source.list(page, per_page).await {
        Ok(listing) => {
            debug!(page, items = listing.len(), source = source.name(), "Fetched listing page");
            PageFetch::Loaded(listing)
        }
        Err(e) => {
            let kind = classify(&e);
            warn!(
                page,
                error = %e,
                kind = ?kind,
                source = source.name(),
                "Error fetching wallpapers, treating page as empty"
            );
            PageFetch::Failed { page, kind }
        }
    }
}

fn classify(error: &Error) -> FetchFailureKind {
    match error {
        Error::Http { status, .. } => FetchFailureKind::Status(*status),
        Error::Network(e) if e.is_decode() => FetchFailureKind::Decode,
        Error::Network(e) => match e.status() {
            Some(status) => FetchFailureKind::Status(status.as_u16()),
            None => FetchFailureKind::Transport,
        },
        Error::Serialization(_) => FetchFailureKind::Decode,
        Error::InvalidArgument(_) => FetchFailureKind::InvalidRequest,
        _ => FetchFailureKind::Transport,
    }
}
