//! The single detail-viewed item

use crate::types::{CatalogItem, Event, ItemId};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::debug;

/// Tracks which item, if any, is detail-viewed
///
/// Cloning is cheap and every clone shares the same selection. A present
/// selection is what gates the preview surface and the download trigger.
#[derive(Clone)]
pub struct SelectionState {
    current: Arc<watch::Sender<Option<CatalogItem>>>,
    event_tx: broadcast::Sender<Event>,
}

impl SelectionState {
    /// Create an empty selection
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        let (current, _rx) = watch::channel(None);
        Self {
            current: Arc::new(current),
            event_tx,
        }
    }

    /// Make `item` the selection, replacing any previous one
    pub fn select(&self, item: CatalogItem) {
        let id = item.id;
        self.current.send_replace(Some(item));
        debug!(item_id = %id, "Selected item");
        self.event_tx
            .send(Event::SelectionChanged { item_id: Some(id) })
            .ok();
    }

    /// Dismiss the selection; returns whether anything was selected
    pub fn clear(&self) -> bool {
        let cleared = self.current.send_if_modified(|current| current.take().is_some());
        if cleared {
            debug!("Cleared selection");
            self.event_tx
                .send(Event::SelectionChanged { item_id: None })
                .ok();
        }
        cleared
    }

    /// Currently selected item
    pub fn current(&self) -> Option<CatalogItem> {
        self.current.borrow().clone()
    }

    /// Id of the selected item
    pub fn current_id(&self) -> Option<ItemId> {
        self.current.borrow().as_ref().map(|item| item.id)
    }

    /// Whether the detail view should be presented
    pub fn is_presented(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Watch the selection
    pub fn subscribe(&self) -> watch::Receiver<Option<CatalogItem>> {
        self.current.subscribe()
    }
}
