//! Paginated item list
//!
//! [`PaginationController`] owns the growing item list, the next-page cursor
//! and the in-flight flag. The flag is claimed with a single check-and-set on
//! the watch channel, so at most one listing request is ever in flight and
//! pages are requested strictly in increasing order.

use crate::catalog::{self, CatalogSource, PageFetch};
use crate::types::{Event, FetchFailureKind, PaginationState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};
use utoipa::ToSchema;

/// What a single `load_next`/`refresh` call did
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Another fetch was already in flight; nothing happened
    Busy,
    /// A page was fetched and merged
    Loaded(PageReport),
}

/// Details of a merged page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageReport {
    /// Page number that was requested
    pub page: u32,
    /// Items the page contributed
    pub added: usize,
    /// Items in the list afterwards
    pub total_items: usize,
    /// Whether the list was replaced rather than appended to
    pub replaced: bool,
    /// Set when the fetch failed and was treated as an empty page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FetchFailureKind>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Merge {
    Append,
    Replace,
}

/// Owner of the paginated item list
pub struct PaginationController {
    source: Arc<dyn CatalogSource>,
    page_size: u32,
    state: watch::Sender<PaginationState>,
    event_tx: broadcast::Sender<Event>,
}

impl PaginationController {
    /// Create a controller starting at page 1 with no items
    pub fn new(
        source: Arc<dyn CatalogSource>,
        page_size: u32,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        let (state, _rx) = watch::channel(PaginationState::default());
        Self {
            source,
            page_size,
            state,
            event_tx,
        }
    }

    /// Current state
    pub fn snapshot(&self) -> PaginationState {
        self.state.borrow().clone()
    }

    /// Watch the state; a new value is published on every change
    pub fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.state.subscribe()
    }

    /// Fetch `next_page` and append its items.
    ///
    /// A no-op returning [`LoadOutcome::Busy`] while another fetch is in
    /// flight. A failed fetch counts as an empty page: the cursor still
    /// advances.
    pub async fn load_next(&self) -> LoadOutcome {
        self.load(Merge::Append).await
    }

    /// Fetch page 1 and replace the whole list with it; the cursor becomes 2.
    ///
    /// Respects the same in-flight guard as [`load_next`](Self::load_next).
    pub async fn refresh(&self) -> LoadOutcome {
        self.load(Merge::Replace).await
    }

    async fn load(&self, merge: Merge) -> LoadOutcome {
        let Some(page) = self.claim(merge) else {
            debug!("Listing fetch already in flight, ignoring trigger");
            return LoadOutcome::Busy;
        };
        let mut guard = LoadingGuard {
            state: &self.state,
            armed: true,
        };

        let fetch = catalog::fetch_page(self.source.as_ref(), page, self.page_size).await;
        let failure = fetch.failure();
        if let PageFetch::Failed { page, kind } = &fetch {
            self.emit(Event::PageFetchFailed {
                page: *page,
                kind: *kind,
            });
        }
        let listing = fetch.into_page();
        let added = listing.len();

        let mut total_items = 0;
        self.state.send_modify(|state| {
            match merge {
                Merge::Append => state.items.extend(listing.items),
                Merge::Replace => state.items = listing.items,
            }
            state.next_page = page + 1;
            state.is_loading = false;
            total_items = state.items.len();
        });
        guard.armed = false;

        let replaced = merge == Merge::Replace;
        info!(page, added, total_items, replaced, "Merged listing page");
        if replaced {
            self.emit(Event::Refreshed {
                total_items,
                degraded: failure.is_some(),
            });
        } else {
            self.emit(Event::PageLoaded {
                page,
                added,
                total_items,
                degraded: failure.is_some(),
            });
        }

        LoadOutcome::Loaded(PageReport {
            page,
            added,
            total_items,
            replaced,
            failure,
        })
    }

    /// Set `is_loading` if it was clear; returns the page to request.
    fn claim(&self, merge: Merge) -> Option<u32> {
        let mut claimed = None;
        self.state.send_if_modified(|state| {
            if state.is_loading {
                return false;
            }
            state.is_loading = true;
            claimed = Some(match merge {
                Merge::Append => state.next_page,
                Merge::Replace => 1,
            });
            true
        });
        claimed
    }

    fn emit(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine
        self.event_tx.send(event).ok();
    }
}

/// Clears `is_loading` if a load future is dropped before merging.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<PaginationState>,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|state| state.is_loading = false);
        }
    }
}
