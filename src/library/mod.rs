//! On-disk media library backed by SQLite
//!
//! [`MediaLibrary`] is the concrete [`MediaStore`]: registered files are
//! copied under `<library_dir>/assets/`, collections are folders under
//! `<library_dir>/collections/`, and the catalog of both lives in SQLite.
//!
//! ## Submodules
//!
//! Methods on [`MediaLibrary`] are organized by domain:
//! - `migrations` - Library lifecycle, schema migrations
//! - `assets` - Asset registration and lookup
//! - `collections` - Collection membership

use crate::config::StorageConfig;
use crate::download::{AccessStatus, MediaStore};
use crate::error::{Error, Result};
use crate::types::Asset;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, sqlite::SqlitePool};
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

mod assets;
mod collections;
mod migrations;

/// Asset record from the library database
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    /// Unique database ID
    pub id: i64,
    /// Current on-disk location
    pub path: String,
    /// Unix timestamp when the asset was registered
    pub created_at: i64,
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        Asset {
            id: row.id,
            path: PathBuf::from(row.path),
            created_at: timestamp(row.created_at),
        }
    }
}

/// A named group of assets
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Collection {
    /// Unique database ID
    pub id: i64,
    /// Collection name, unique within the library
    pub name: String,
    /// When the collection was created
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    /// Number of assets in the collection
    pub asset_count: i64,
}

/// Collection record from the library database
#[derive(Debug, Clone, FromRow)]
struct CollectionRow {
    id: i64,
    name: String,
    created_at: i64,
    asset_count: i64,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Collection {
            id: row.id,
            name: row.name,
            created_at: timestamp(row.created_at),
            asset_count: row.asset_count,
        }
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// SQLite-backed media library
pub struct MediaLibrary {
    pool: SqlitePool,
    root: PathBuf,
    grant_access: bool,
}

impl MediaLibrary {
    /// Directory holding registered asset files
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    /// Directory holding the files of collection `name`
    pub fn collection_dir(&self, name: &str) -> PathBuf {
        self.root.join("collections").join(sanitize_dir_name(name))
    }
}

/// Folder name for a collection: anything outside `[A-Za-z0-9 _-]` becomes `_`
fn sanitize_dir_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Final path component as a string, or an error naming the path
fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::MediaStore(format!("not a file path: {}", path.display())))
}

#[async_trait]
impl MediaStore for MediaLibrary {
    async fn request_access(&self) -> Result<AccessStatus> {
        if !self.grant_access {
            tracing::info!(root = %self.root.display(), "Media library access not granted");
            return Ok(AccessStatus::Denied);
        }
        tokio::fs::create_dir_all(self.assets_dir()).await?;
        Ok(AccessStatus::Granted)
    }

    async fn register_asset(&self, path: &Path) -> Result<Asset> {
        self.import_file(path).await
    }

    async fn add_to_collection(
        &self,
        collection: &str,
        asset: &Asset,
        copy: bool,
    ) -> Result<Asset> {
        self.add_asset_to_collection(collection, asset, copy).await
    }

    fn name(&self) -> &'static str {
        "sqlite-library"
    }
}

impl MediaLibrary {
    /// Open the library described by `storage`, see [`MediaLibrary::new`].
    pub async fn open(storage: &StorageConfig) -> Result<Self> {
        Self::new(
            &storage.database_path,
            &storage.library_dir,
            storage.grant_access,
        )
        .await
    }
}
