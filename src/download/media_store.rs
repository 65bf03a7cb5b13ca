//! Persistent, user-visible media store seam

use crate::error::Result;
use crate::types::Asset;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Answer to a storage-write authorization request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    /// Writes are allowed
    Granted,
    /// Writes are refused
    Denied,
}

/// The device's persistent collection of saved photos and albums
///
/// # Examples
///
/// ```no_run
/// use wallpaper_dl::download::{AccessStatus, MediaStore};
/// use wallpaper_dl::library::MediaLibrary;
/// use wallpaper_dl::config::StorageConfig;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let library = MediaLibrary::open(&StorageConfig::default()).await?;
/// if library.request_access().await? == AccessStatus::Granted {
///     let asset = library.register_asset(Path::new("documents/wallpaper_1.jpg")).await?;
///     library.add_to_collection("Wallpapers", &asset, false).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Ask for storage-write authorization
    async fn request_access(&self) -> Result<AccessStatus>;

    /// Register the file at `path` as a new asset
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or recorded.
    async fn register_asset(&self, path: &Path) -> Result<Asset>;

    /// Group `asset` into the named collection, creating the collection on
    /// first use.
    ///
    /// With `copy == false` the asset itself joins the collection; with
    /// `copy == true` a duplicate does. Returns the asset as it now exists in
    /// the collection.
    async fn add_to_collection(&self, collection: &str, asset: &Asset, copy: bool)
    -> Result<Asset>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
