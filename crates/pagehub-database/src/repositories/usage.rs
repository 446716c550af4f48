//! Asset usage index repository.

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use pagehub_core::error::{AppError, ErrorKind};
use pagehub_core::result::AppResult;
use pagehub_entity::content::ContentKind;
use pagehub_entity::usage::{AssetUsage, NewAssetUsage};

/// Repository for the `asset_usages` reverse index.
#[derive(Debug, Clone)]
pub struct AssetUsageRepository {
    pool: PgPool,
}

impl AssetUsageRepository {
    /// Create a new asset usage repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace every usage of one content item with `usages`.
    ///
    /// Delete and inserts share one transaction, so a failure leaves the
    /// previous record set in place.
    pub async fn replace_for_content(
        &self,
        content_id: i64,
        content_type: ContentKind,
        usages: &[NewAssetUsage],
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        let removed = sqlx::query(
            "DELETE FROM asset_usages WHERE content_id = $1 AND content_type = $2",
        )
        .bind(content_id)
        .bind(content_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete usages", e))?
        .rows_affected();

        for usage in usages {
            sqlx::query(
                "INSERT INTO asset_usages \
                 (asset_id, content_id, content_type, content_title, reference_kind, last_seen_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(usage.asset_id)
            .bind(usage.content_id)
            .bind(usage.content_type.as_str())
            .bind(&usage.content_title)
            .bind(usage.reference_kind.as_str())
            .bind(usage.last_seen_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert usage", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit usages", e))?;

        debug!(
            content_id,
            content_type = %content_type,
            removed,
            inserted = usages.len(),
            "Replaced asset usages"
        );
        Ok(())
    }

    /// Delete the whole index. Returns the number of removed rows.
    pub async fn delete_all(&self) -> AppResult<u64> {
        sqlx::query("DELETE FROM asset_usages")
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear usages", e))
    }

    /// List usages of the given assets, grouped by asset.
    pub async fn find_by_assets(&self, asset_ids: &[Uuid]) -> AppResult<Vec<AssetUsage>> {
        sqlx::query_as::<_, AssetUsage>(
            "SELECT * FROM asset_usages WHERE asset_id = ANY($1) \
             ORDER BY asset_id, content_type, content_title",
        )
        .bind(asset_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list usages", e))
    }
}
