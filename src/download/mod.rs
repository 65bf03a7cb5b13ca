//! Single active download: permission, transfer, registration, cleanup
//!
//! [`DownloadController`] drives one user-initiated download at a time:
//!
//! 1. ask the [`MediaStore`] for write access (denied = fail, no I/O)
//! 2. stream the item's full-size image into the document directory via
//!    [`Transfer`], republishing a monotonic progress fraction
//! 3. register the file as an asset and group it into the configured
//!    collection
//!
//! Whatever happens, the download leaves `in-progress`, the user gets a
//! [`Notice`] and the selection is cleared. A [`SlotGuard`] backs this up for
//! futures that are dropped or aborted mid-flight.

pub mod media_store;
pub mod progress;
pub mod transfer;

pub use media_store::{AccessStatus, MediaStore};
pub use progress::ProgressTracker;
pub use transfer::{HttpTransfer, Transfer, TransferOptions, TransferProgress, TransferRequest};

use crate::config::{Config, StorageConfig};
use crate::error::{DownloadError, Error, Result};
use crate::selection::SelectionState;
use crate::types::{
    CatalogItem, DownloadState, DownloadStatus, Event, ItemId, Notice, SavedWallpaper,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

/// The item currently owning the download slot
#[derive(Clone, Debug)]
struct ActiveSlot {
    item_id: ItemId,
    cancel: CancellationToken,
}

/// Owner of the single download slot and its observable state
pub struct DownloadController {
    transfer: Arc<dyn Transfer>,
    media_store: Arc<dyn MediaStore>,
    selection: SelectionState,
    storage: StorageConfig,
    resume_partial: bool,
    state: Arc<watch::Sender<DownloadState>>,
    slot: Arc<watch::Sender<Option<ActiveSlot>>>,
    event_tx: broadcast::Sender<Event>,
}

impl DownloadController {
    /// Create an idle controller
    pub fn new(
        transfer: Arc<dyn Transfer>,
        media_store: Arc<dyn MediaStore>,
        selection: SelectionState,
        config: &Config,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        let (state, _state_rx) = watch::channel(DownloadState::default());
        let (slot, _slot_rx) = watch::channel(None);
        Self {
            transfer,
            media_store,
            selection,
            storage: config.storage.clone(),
            resume_partial: config.download.resume_partial,
            state: Arc::new(state),
            slot: Arc::new(slot),
            event_tx,
        }
    }

    /// Current download state
    pub fn snapshot(&self) -> DownloadState {
        self.state.borrow().clone()
    }

    /// Watch the download state
    pub fn subscribe(&self) -> watch::Receiver<DownloadState> {
        self.state.subscribe()
    }

    /// Item owning the slot, if any (including while permission is requested)
    pub fn active_item(&self) -> Option<ItemId> {
        self.slot.borrow().as_ref().map(|active| active.item_id)
    }

    /// Where the transfer for `item` lands
    pub fn local_path(&self, item: &CatalogItem) -> PathBuf {
        self.storage
            .document_dir
            .join(local_file_name(item, &self.storage))
    }

    /// Download `item` into the media library and wait for the outcome.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Busy`] if another download owns the slot; nothing
    ///   else happens in that case
    /// - [`DownloadError::PermissionDenied`], [`DownloadError::NoResult`],
    ///   [`DownloadError::Registration`], [`DownloadError::Cancelled`] or the
    ///   transfer's own error; the state is `failed` and the user was notified
    pub async fn start_download(&self, item: CatalogItem) -> Result<SavedWallpaper> {
        let slot = self.claim(&item)?;
        self.run(item, slot).await
    }

    /// Claim the slot now and run the download on a tokio task.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Busy`] without spawning if the slot is taken.
    pub fn spawn_download(
        self: &Arc<Self>,
        item: CatalogItem,
    ) -> Result<tokio::task::JoinHandle<Result<SavedWallpaper>>> {
        let slot = self.claim(&item)?;
        let controller = Arc::clone(self);
        Ok(tokio::spawn(async move { controller.run(item, slot).await }))
    }

    /// Cancel the active download; returns the item that was cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::NoActiveDownload`] if the slot is free.
    pub fn cancel(&self) -> Result<ItemId> {
        match self.slot.borrow().as_ref() {
            Some(active) => {
                info!(item_id = %active.item_id, "Cancelling download");
                active.cancel.cancel();
                Ok(active.item_id)
            }
            None => Err(DownloadError::NoActiveDownload.into()),
        }
    }

    /// Return a finished download's state to `idle`.
    ///
    /// Does nothing (and returns false) while a download owns the slot.
    pub fn reset(&self) -> bool {
        if self.slot.borrow().is_some() {
            return false;
        }
        self.state.send_if_modified(|state| {
            if state.status == DownloadStatus::Idle && state.target.is_none() {
                return false;
            }
            *state = DownloadState::default();
            true
        })
    }

    /// Resolve once no download owns the slot
    pub async fn wait_until_idle(&self) {
        let mut slot = self.slot.subscribe();
        // Only fails if the sender is gone, in which case nothing is active.
        let _ = slot.wait_for(|active| active.is_none()).await;
    }

    fn claim(&self, item: &CatalogItem) -> Result<SlotGuard> {
        let cancel = CancellationToken::new();
        let mut busy_with = None;
        self.slot.send_if_modified(|slot| match slot {
            Some(active) => {
                busy_with = Some(active.item_id);
                false
            }
            None => {
                *slot = Some(ActiveSlot {
                    item_id: item.id,
                    cancel: cancel.clone(),
                });
                true
            }
        });

        if let Some(active) = busy_with {
            warn!(item_id = %item.id, active = %active, "Rejected download: another is in progress");
            return Err(DownloadError::Busy { active }.into());
        }

        // The previous outcome no longer describes the slot's owner.
        self.state.send_replace(DownloadState {
            target: Some(item.clone()),
            ..DownloadState::default()
        });

        Ok(SlotGuard {
            item_id: item.id,
            cancel,
            slot: Arc::clone(&self.slot),
            state: Arc::clone(&self.state),
            selection: self.selection.clone(),
            event_tx: self.event_tx.clone(),
        })
    }

    async fn run(&self, item: CatalogItem, slot: SlotGuard) -> Result<SavedWallpaper> {
        let result = self.execute(&item, &slot.cancel).await;
        match &result {
            Ok(saved) => self.finish_success(saved),
            Err(e) => self.finish_failure(&item, e),
        }
        drop(slot);
        result
    }

    async fn execute(&self, item: &CatalogItem, cancel: &CancellationToken) -> Result<SavedWallpaper> {
        let id = item.id;

        match self.media_store.request_access().await {
            Ok(AccessStatus::Granted) => {}
            Ok(AccessStatus::Denied) => {
                info!(item_id = %id, store = self.media_store.name(), "Storage permission denied");
                return Err(DownloadError::PermissionDenied { id }.into());
            }
            Err(e) => {
                warn!(item_id = %id, error = %e, "Storage permission request failed, treating as denied");
                return Err(DownloadError::PermissionDenied { id }.into());
            }
        }
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled { id }.into());
        }

        self.state.send_replace(DownloadState {
            target: Some(item.clone()),
            fraction_complete: 0.0,
            status: DownloadStatus::InProgress,
            bytes_written: 0,
            bytes_expected: 0,
            error: None,
        });
        self.emit(Event::DownloadStarted { item_id: id });

        let request = TransferRequest {
            source_url: item.full_url.clone(),
            destination: self.local_path(item),
            options: TransferOptions {
                resume: self.resume_partial,
                headers: Vec::new(),
            },
        };
        info!(
            item_id = %id,
            url = %request.source_url,
            path = %request.destination.display(),
            transfer = self.transfer.name(),
            "Download started"
        );

        let tracker = Mutex::new(ProgressTracker::new());
        let on_progress = |tick: TransferProgress| {
            if cancel.is_cancelled() {
                return;
            }
            let (fraction, bytes_written, bytes_expected) = {
                let mut tracker = tracker.lock().unwrap_or_else(PoisonError::into_inner);
                let fraction = tracker.observe(tick);
                (fraction, tracker.bytes_written(), tracker.bytes_expected())
            };
            self.state.send_modify(|state| {
                state.fraction_complete = fraction;
                state.bytes_written = bytes_written;
                state.bytes_expected = bytes_expected;
            });
            trace!(item_id = %id, fraction, bytes_written, bytes_expected, "Download progress");
            self.emit(Event::DownloadProgress {
                item_id: id,
                fraction,
                bytes_written,
                bytes_expected,
            });
        };

        let transferred = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(DownloadError::Cancelled { id }.into());
            }
            result = self.transfer.download(&request, &on_progress) => result?,
        };

        let Some(saved_path) = transferred else {
            warn!(item_id = %id, "Download failed: no result returned");
            return Err(DownloadError::NoResult { id }.into());
        };
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled { id }.into());
        }

        // Every byte is on disk, even when the total was never announced.
        let fraction = tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .complete();
        self.state
            .send_modify(|state| state.fraction_complete = fraction);

        self.register(id, &saved_path).await
    }

    async fn register(&self, id: ItemId, path: &Path) -> Result<SavedWallpaper> {
        let collection = self.storage.collection_name.clone();
        let registration = |e: Error| -> Error {
            DownloadError::Registration {
                id,
                reason: e.to_string(),
            }
            .into()
        };

        let asset = self
            .media_store
            .register_asset(path)
            .await
            .map_err(registration)?;
        let asset = self
            .media_store
            .add_to_collection(&collection, &asset, self.storage.copy_into_collection)
            .await
            .map_err(registration)?;

        Ok(SavedWallpaper {
            item_id: id,
            asset,
            collection,
        })
    }

    fn finish_success(&self, saved: &SavedWallpaper) {
        self.state.send_modify(|state| {
            state.status = DownloadStatus::Succeeded;
            state.error = None;
        });
        info!(
            item_id = %saved.item_id,
            asset_id = saved.asset.id,
            collection = %saved.collection,
            "Wallpaper saved"
        );
        self.emit(Event::DownloadSucceeded {
            item_id: saved.item_id,
            asset_id: saved.asset.id,
            collection: saved.collection.clone(),
        });
        self.emit(Event::Notice {
            notice: Notice::saved(),
        });
        self.selection.clear();
    }

    fn finish_failure(&self, item: &CatalogItem, err: &Error) {
        let message = err.to_string();
        self.state.send_modify(|state| {
            if !state.is_in_progress() {
                *state = DownloadState {
                    target: Some(item.clone()),
                    ..DownloadState::default()
                };
            }
            state.status = DownloadStatus::Failed;
            state.error = Some(message.clone());
        });

        let notice = match err {
            Error::Download(DownloadError::PermissionDenied { .. }) => Notice::permission_needed(),
            Error::Download(DownloadError::Cancelled { .. }) => Notice::cancelled(),
            _ => {
                error!(item_id = %item.id, error = %err, "Download failed");
                Notice::download_failed()
            }
        };
        self.emit(Event::DownloadFailed {
            item_id: item.id,
            error: message,
        });
        self.emit(Event::Notice { notice });
        self.selection.clear();
    }

    fn emit(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine
        self.event_tx.send(event).ok();
    }
}

/// Holds the download slot; releases it on drop.
///
/// If the owning future is dropped while the state is still `in-progress`,
/// the state is failed and the selection cleared before the slot is freed.
struct SlotGuard {
    item_id: ItemId,
    cancel: CancellationToken,
    slot: Arc<watch::Sender<Option<ActiveSlot>>>,
    state: Arc<watch::Sender<DownloadState>>,
    selection: SelectionState,
    event_tx: broadcast::Sender<Event>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let item_id = self.item_id;
        let interrupted = self.state.send_if_modified(|state| {
            let ours = state.target.as_ref().map(|t| t.id) == Some(item_id);
            if !(ours && state.is_in_progress()) {
                return false;
            }
            state.status = DownloadStatus::Failed;
            state.error = Some("download interrupted".to_string());
            true
        });
        if interrupted {
            warn!(item_id = %item_id, "Download dropped mid-flight, marked failed");
            self.event_tx
                .send(Event::DownloadFailed {
                    item_id,
                    error: "download interrupted".to_string(),
                })
                .ok();
            self.selection.clear();
        }
        self.slot.send_replace(None);
    }
}

/// File name the transfer for `item` is saved under.
///
/// Derived from the item id so different items never collide on disk. The
/// extension comes from the full-size URL when it looks like one.
pub fn local_file_name(item: &CatalogItem, storage: &StorageConfig) -> String {
    let extension =
        url_extension(&item.full_url).unwrap_or_else(|| storage.default_extension.clone());
    format!("{}{}.{}", storage.file_prefix, item.id, extension)
}

fn url_extension(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let extension = Path::new(parsed.path()).extension()?.to_str()?;
    let valid = (1..=5).contains(&extension.len())
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| extension.to_ascii_lowercase())
}
