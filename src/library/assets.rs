//! Asset registration and lookup.

use crate::error::DatabaseError;
use crate::types::Asset;
use crate::{Error, Result};
use std::path::Path;

use super::{AssetRow, MediaLibrary, file_name_of};

impl MediaLibrary {
    /// Copy the file at `source` into the library and record it.
    ///
    /// The copy is named `<asset id>_<original name>` so repeated imports of
    /// the same file never overwrite each other. The source file is left in
    /// place.
    pub async fn import_file(&self, source: &Path) -> Result<Asset> {
        let metadata = tokio::fs::metadata(source).await?;
        if !metadata.is_file() {
            return Err(Error::MediaStore(format!(
                "not a regular file: {}",
                source.display()
            )));
        }
        let file_name = file_name_of(source)?;

        let id = self.insert_asset(&source.to_string_lossy()).await?;
        let assets_dir = self.assets_dir();
        let destination = assets_dir.join(format!("{}_{}", id, file_name));

        let copied = async {
            tokio::fs::create_dir_all(&assets_dir).await?;
            tokio::fs::copy(source, &destination).await
        }
        .await;
        if let Err(e) = copied {
            // Don't leave a record pointing at a file that was never written.
            if let Err(cleanup) = self.delete_asset(id).await {
                tracing::warn!(asset_id = id, error = %cleanup, "Failed to remove orphaned asset record");
            }
            return Err(e.into());
        }

        self.update_asset_path(id, &destination).await?;
        tracing::info!(
            asset_id = id,
            source = %source.display(),
            path = %destination.display(),
            bytes = metadata.len(),
            "Asset registered"
        );
        self.require_asset(id).await
    }

    /// Insert an asset record, returning its id
    pub(super) async fn insert_asset(&self, path: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO assets (path, created_at) VALUES (?, ?)")
            .bind(path)
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to insert asset: {}",
                    e
                )))
            })?;

        Ok(result.last_insert_rowid())
    }

    /// Point an asset at a new on-disk location
    pub(super) async fn update_asset_path(&self, id: i64, path: &Path) -> Result<()> {
        let result = sqlx::query("UPDATE assets SET path = ? WHERE id = ?")
            .bind(path.to_string_lossy().as_ref())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update asset path: {}",
                    e
                )))
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "asset {}",
                id
            ))));
        }
        Ok(())
    }

    async fn delete_asset(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete asset: {}",
                    e
                )))
            })?;
        Ok(())
    }

    /// Get an asset by ID
    pub async fn get_asset(&self, id: i64) -> Result<Option<Asset>> {
        let row = sqlx::query_as::<_, AssetRow>(
            "SELECT id, path, created_at FROM assets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get asset: {}",
                e
            )))
        })?;

        Ok(row.map(Asset::from))
    }

    pub(super) async fn require_asset(&self, id: i64) -> Result<Asset> {
        self.get_asset(id).await?.ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!("asset {}", id)))
        })
    }

    /// List all assets, oldest first
    pub async fn list_assets(&self) -> Result<Vec<Asset>> {
        let rows = sqlx::query_as::<_, AssetRow>(
            "SELECT id, path, created_at FROM assets ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list assets: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(Asset::from).collect())
    }
}
