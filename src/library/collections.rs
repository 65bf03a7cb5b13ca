//! Collection membership.

use crate::error::DatabaseError;
use crate::types::Asset;
use crate::{Error, Result};
use std::path::Path;

use super::{AssetRow, Collection, CollectionRow, MediaLibrary, file_name_of};

impl MediaLibrary {
    /// Add `asset` to the collection `name`, creating the collection on first use.
    ///
    /// With `copy == false` the asset's file moves into the collection folder
    /// and the same asset is returned with its new path. With `copy == true`
    /// a duplicate asset is created inside the collection and returned; the
    /// original stays where it was.
    pub async fn add_asset_to_collection(
        &self,
        name: &str,
        asset: &Asset,
        copy: bool,
    ) -> Result<Asset> {
        let current = self.require_asset(asset.id).await?;
        let collection_id = self.ensure_collection(name).await?;
        let dir = self.collection_dir(name);
        tokio::fs::create_dir_all(&dir).await?;
        let file_name = file_name_of(&current.path)?;

        let member = if copy {
            let id = self.insert_asset(&current.path.to_string_lossy()).await?;
            let destination = dir.join(format!("{}_{}", id, file_name));
            tokio::fs::copy(&current.path, &destination).await?;
            self.update_asset_path(id, &destination).await?;
            id
        } else {
            let destination = dir.join(&file_name);
            if current.path != destination {
                move_file(&current.path, &destination).await?;
                self.update_asset_path(current.id, &destination).await?;
            }
            current.id
        };

        self.link(collection_id, member).await?;
        tracing::info!(
            collection = name,
            asset_id = member,
            copy,
            "Asset added to collection"
        );
        self.require_asset(member).await
    }

    /// Id of collection `name`, inserting it if missing
    async fn ensure_collection(&self, name: &str) -> Result<i64> {
        sqlx::query("INSERT OR IGNORE INTO collections (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to create collection: {}",
                    e
                )))
            })?;

        sqlx::query_scalar("SELECT id FROM collections WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to look up collection: {}",
                    e
                )))
            })
    }

    async fn link(&self, collection_id: i64, asset_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO collection_assets (collection_id, asset_id, added_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(collection_id)
        .bind(asset_id)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to add asset to collection: {}",
                e
            )))
        })?;
        Ok(())
    }

    /// Get a collection by name
    pub async fn get_collection(&self, name: &str) -> Result<Option<Collection>> {
        let row = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT c.id, c.name, c.created_at, COUNT(ca.asset_id) AS asset_count
            FROM collections c
            LEFT JOIN collection_assets ca ON ca.collection_id = c.id
            WHERE c.name = ?
            GROUP BY c.id
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get collection: {}",
                e
            )))
        })?;

        Ok(row.map(Collection::from))
    }

    /// List all collections by name
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT c.id, c.name, c.created_at, COUNT(ca.asset_id) AS asset_count
            FROM collections c
            LEFT JOIN collection_assets ca ON ca.collection_id = c.id
            GROUP BY c.id
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list collections: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

    /// Assets in collection `name`, in the order they were added
    ///
    /// An unknown collection has no assets.
    pub async fn collection_assets(&self, name: &str) -> Result<Vec<Asset>> {
        let rows = sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT a.id, a.path, a.created_at
            FROM assets a
            JOIN collection_assets ca ON ca.asset_id = a.id
            JOIN collections c ON c.id = ca.collection_id
            WHERE c.name = ?
            ORDER BY ca.added_at ASC, a.id ASC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list collection assets: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(Asset::from).collect())
    }
}

/// Rename, falling back to copy + remove across filesystems
async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}
