//! Shared fakes and fixtures for unit tests.

use crate::catalog::CatalogSource;
use crate::config::Config;
use crate::download::{AccessStatus, MediaStore, Transfer, TransferProgress, TransferRequest};
use crate::error::{Error, Result};
use crate::types::{Asset, CatalogItem, CatalogPage, ItemId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// A catalog item with predictable URLs
pub(crate) fn sample_item(id: u64) -> CatalogItem {
    CatalogItem {
        id: ItemId(id),
        preview_url: format!("https://cdn.example/preview/{id}_640.jpg"),
        full_url: format!("https://cdn.example/full/{id}_1280.jpg"),
        owner: format!("owner{id}"),
        tags: "sky, clouds, blue".to_string(),
    }
}

/// `count` items with consecutive ids starting at `first`
pub(crate) fn sample_items(first: u64, count: u64) -> Vec<CatalogItem> {
    (first..first + count).map(sample_item).collect()
}

/// Config rooted in `root` so tests never touch the real home directory
pub(crate) fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.storage.document_dir = root.join("documents");
    config.storage.library_dir = root.join("library");
    config.storage.database_path = root.join("library").join("library.db");
    config
}

/// Catalog that answers from a script and records every call
///
/// Unknown pages answer with zero items. `list` yields once before answering
/// so concurrent callers really do overlap.
#[derive(Default)]
pub(crate) struct ScriptedCatalog {
    pages: Mutex<HashMap<u32, std::result::Result<Vec<CatalogItem>, u16>>>,
    requests: Mutex<Vec<(u32, u32)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(self, page: u32, items: Vec<CatalogItem>) -> Self {
        self.set_page(page, items);
        self
    }

    pub(crate) fn with_status_failure(self, page: u32, status: u16) -> Self {
        self.fail_page(page, status);
        self
    }

    pub(crate) fn set_page(&self, page: u32, items: Vec<CatalogItem>) {
        self.pages.lock().unwrap().insert(page, Ok(items));
    }

    pub(crate) fn fail_page(&self, page: u32, status: u16) {
        self.pages.lock().unwrap().insert(page, Err(status));
    }

    /// `(page, per_page)` of every call, in order
    pub(crate) fn requests(&self) -> Vec<(u32, u32)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn list(&self, page: u32, per_page: u32) -> Result<CatalogPage> {
        self.requests.lock().unwrap().push((page, per_page));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::task::yield_now().await;

        let scripted = self.pages.lock().unwrap().get(&page).cloned();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match scripted {
            Some(Ok(items)) => Ok(CatalogPage {
                page,
                items,
                total_hits: None,
            }),
            Some(Err(status)) => Err(Error::Http {
                status,
                url: "https://catalog.test/api/".to_string(),
            }),
            None => Ok(CatalogPage::empty(page)),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// What a [`FakeTransfer`] does when asked to download
#[derive(Clone, Debug)]
pub(crate) enum TransferScript {
    /// Report each tick, write `body` to the destination and return its path
    Complete {
        body: Vec<u8>,
        ticks: Vec<(u64, u64)>,
    },
    /// Return no result without writing anything
    NoResult,
    /// Fail with a network-style error
    Fail(String),
    /// Report one tick, then wait for [`FakeTransfer::release`] before completing
    Gated { body: Vec<u8> },
}

/// Scripted [`Transfer`] that records its requests
pub(crate) struct FakeTransfer {
    script: TransferScript,
    gate: Notify,
    requests: Mutex<Vec<TransferRequest>>,
}

impl FakeTransfer {
    pub(crate) fn new(script: TransferScript) -> Self {
        Self {
            script,
            gate: Notify::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Transfer that writes `body` in two ticks
    pub(crate) fn completing(body: &[u8]) -> Self {
        let len = body.len() as u64;
        Self::new(TransferScript::Complete {
            body: body.to_vec(),
            ticks: vec![(0, len), (len / 2, len), (len, len)],
        })
    }

    pub(crate) fn gated(body: &[u8]) -> Self {
        Self::new(TransferScript::Gated {
            body: body.to_vec(),
        })
    }

    /// Let a gated transfer finish
    pub(crate) fn release(&self) {
        self.gate.notify_one();
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<TransferRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn write_destination(destination: &Path, body: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(destination, body).await?;
    Ok(destination.to_path_buf())
}

#[async_trait]
impl Transfer for FakeTransfer {
    async fn download(
        &self,
        request: &TransferRequest,
        on_progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> Result<Option<PathBuf>> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            TransferScript::Complete { body, ticks } => {
                for (bytes_written, bytes_expected) in ticks {
                    on_progress(TransferProgress {
                        bytes_written: *bytes_written,
                        bytes_expected: *bytes_expected,
                    });
                }
                Ok(Some(write_destination(&request.destination, body).await?))
            }
            TransferScript::NoResult => Ok(None),
            TransferScript::Fail(message) => Err(Error::Other(message.clone())),
            TransferScript::Gated { body } => {
                let len = body.len() as u64;
                on_progress(TransferProgress {
                    bytes_written: 0,
                    bytes_expected: len,
                });
                self.gate.notified().await;
                on_progress(TransferProgress {
                    bytes_written: len,
                    bytes_expected: len,
                });
                Ok(Some(write_destination(&request.destination, body).await?))
            }
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// In-memory [`MediaStore`]
pub(crate) struct FakeMediaStore {
    access: std::result::Result<AccessStatus, String>,
    fail_register: bool,
    fail_collection: bool,
    next_id: AtomicI64,
    registered: Mutex<Vec<PathBuf>>,
    collected: Mutex<Vec<(String, i64, bool)>>,
}

impl FakeMediaStore {
    pub(crate) fn granting() -> Self {
        Self::with_access(Ok(AccessStatus::Granted))
    }

    pub(crate) fn denying() -> Self {
        Self::with_access(Ok(AccessStatus::Denied))
    }

    pub(crate) fn with_access(access: std::result::Result<AccessStatus, String>) -> Self {
        Self {
            access,
            fail_register: false,
            fail_collection: false,
            next_id: AtomicI64::new(1),
            registered: Mutex::new(Vec::new()),
            collected: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_register(mut self) -> Self {
        self.fail_register = true;
        self
    }

    pub(crate) fn failing_collection(mut self) -> Self {
        self.fail_collection = true;
        self
    }

    pub(crate) fn registered(&self) -> Vec<PathBuf> {
        self.registered.lock().unwrap().clone()
    }

    /// `(collection, asset id, copy)` of every collection add
    pub(crate) fn collected(&self) -> Vec<(String, i64, bool)> {
        self.collected.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn request_access(&self) -> Result<AccessStatus> {
        self.access.clone().map_err(Error::MediaStore)
    }

    async fn register_asset(&self, path: &Path) -> Result<Asset> {
        if self.fail_register {
            return Err(Error::MediaStore("library is read-only".to_string()));
        }
        self.registered.lock().unwrap().push(path.to_path_buf());
        Ok(Asset {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            path: path.to_path_buf(),
            created_at: chrono::Utc::now(),
        })
    }

    async fn add_to_collection(&self, collection: &str, asset: &Asset, copy: bool) -> Result<Asset> {
        if self.fail_collection {
            return Err(Error::MediaStore(format!(
                "collection '{collection}' is unavailable"
            )));
        }
        self.collected
            .lock()
            .unwrap()
            .push((collection.to_string(), asset.id, copy));
        Ok(asset.clone())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
