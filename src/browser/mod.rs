//! The `WallpaperBrowser` facade.
//!
//! Wires the catalog, pagination, selection and download controllers onto one
//! event bus. Methods are organized by domain:
//! - this module - construction, commands and observation
//! - [`lifecycle`] - graceful shutdown

mod lifecycle;


use crate::catalog::{CatalogSource, HttpCatalogClient};
use crate::config::Config;
use crate::download::{DownloadController, HttpTransfer, MediaStore, Transfer};
use crate::error::{Error, Result};
use crate::library::MediaLibrary;
use crate::pagination::{LoadOutcome, PaginationController};
use crate::selection::SelectionState;
use crate::types::{
    CatalogItem, DownloadState, Event, ItemId, PaginationState, SavedWallpaper,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, watch};
use utoipa::ToSchema;

/// The external services a browser talks to
pub struct Collaborators {
    /// Paginated listing source
    pub catalog: Arc<dyn CatalogSource>,
    /// Byte transfer to local storage
    pub transfer: Arc<dyn Transfer>,
    /// Persistent media store
    pub media_store: Arc<dyn MediaStore>,
}

/// Point-in-time view of every observable value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BrowserSnapshot {
    /// Loaded items and cursor
    pub pagination: PaginationState,
    /// Detail-viewed item
    pub selection: Option<CatalogItem>,
    /// Single download slot
    pub download: DownloadState,
}

/// Main browser instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct WallpaperBrowser {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) pagination: Arc<PaginationController>,
    pub(crate) selection: SelectionState,
    pub(crate) downloads: Arc<DownloadController>,
    /// Set to false during shutdown
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl WallpaperBrowser {
    /// Create a browser backed by the live catalog and the on-disk media library
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Creates the document directory
    /// - Builds the HTTP catalog client and transfer
    /// - Opens/creates the media library database
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.storage.document_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create document directory '{}': {}",
                        config.storage.document_dir.display(),
                        e
                    ),
                ))
            })?;

        let catalog = Arc::new(HttpCatalogClient::new(config.catalog.clone())?);
        let transfer = Arc::new(HttpTransfer::new(&config.catalog)?);
        let media_store = Arc::new(MediaLibrary::open(&config.storage).await?);

        Self::with_collaborators(
            config,
            Collaborators {
                catalog,
                transfer,
                media_store,
            },
        )
    }

    /// Create a browser around caller-supplied collaborators
    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(config.download.event_channel_capacity);
        let selection = SelectionState::new(event_tx.clone());
        let pagination = Arc::new(PaginationController::new(
            collaborators.catalog,
            config.catalog.page_size,
            event_tx.clone(),
        ));
        let downloads = Arc::new(DownloadController::new(
            collaborators.transfer,
            collaborators.media_store,
            selection.clone(),
            &config,
            event_tx.clone(),
        ));

        tracing::info!(
            page_size = config.catalog.page_size,
            collection = %config.storage.collection_name,
            "Wallpaper browser ready"
        );

        Ok(Self {
            config: Arc::new(config),
            event_tx,
            pagination,
            selection,
            downloads,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Append the next page, unless a load is already in flight
    pub async fn load_next(&self) -> LoadOutcome {
        self.pagination.load_next().await
    }

    /// Replace the list with a fresh first page, unless a load is in flight
    pub async fn refresh(&self) -> LoadOutcome {
        self.pagination.refresh().await
    }

    /// Detail-view `item`
    pub fn select(&self, item: CatalogItem) {
        self.selection.select(item);
    }

    /// Detail-view the loaded item with `id`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no loaded item has that id.
    pub fn select_by_id(&self, id: ItemId) -> Result<CatalogItem> {
        let item = self.find_item(id)?;
        self.selection.select(item.clone());
        Ok(item)
    }

    /// Dismiss the detail view.
    ///
    /// Also returns a finished download's state to `idle`. An in-flight
    /// download keeps running.
    pub fn clear_selection(&self) -> bool {
        let cleared = self.selection.clear();
        self.downloads.reset();
        cleared
    }

    /// Currently detail-viewed item
    pub fn selected(&self) -> Option<CatalogItem> {
        self.selection.current()
    }

    /// Loaded item with `id`
    pub fn find_item(&self, id: ItemId) -> Result<CatalogItem> {
        self.pagination
            .snapshot()
            .items
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| Error::NotFound(format!("item {} is not loaded", id)))
    }

    /// Download `item` and wait for the outcome
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once shutdown has begun, otherwise see
    /// [`DownloadController::start_download`].
    pub async fn start_download(&self, item: CatalogItem) -> Result<SavedWallpaper> {
        self.ensure_accepting()?;
        self.downloads.start_download(item).await
    }

    /// Start downloading `item` in the background
    ///
    /// The slot is claimed before this returns, so a following call observes
    /// the download as busy.
    pub fn spawn_download(
        &self,
        item: CatalogItem,
    ) -> Result<tokio::task::JoinHandle<Result<SavedWallpaper>>> {
        self.ensure_accepting()?;
        self.downloads.spawn_download(item)
    }

    /// Cancel the active download
    pub fn cancel_download(&self) -> Result<ItemId> {
        self.downloads.cancel()
    }

    /// Subscribe to browser events
    ///
    /// Events are emitted for page loads, selection changes, download
    /// progress and user notices. Slow subscribers may miss events
    /// (`RecvError::Lagged`); snapshots are always available through the
    /// `watch_*` receivers.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Watch the item list, cursor and loading flag
    pub fn watch_items(&self) -> watch::Receiver<PaginationState> {
        self.pagination.subscribe()
    }

    /// Watch the detail-viewed item
    pub fn watch_selection(&self) -> watch::Receiver<Option<CatalogItem>> {
        self.selection.subscribe()
    }

    /// Watch the download slot
    pub fn watch_download(&self) -> watch::Receiver<DownloadState> {
        self.downloads.subscribe()
    }

    /// Everything observable, right now
    pub fn snapshot(&self) -> BrowserSnapshot {
        BrowserSnapshot {
            pagination: self.pagination.snapshot(),
            selection: self.selection.current(),
            download: self.downloads.snapshot(),
        }
    }

    /// Whether new downloads are accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }

    fn ensure_accepting(&self) -> Result<()> {
        if self.is_accepting() {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }
}
