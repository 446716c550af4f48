//! PostgreSQL-backed [`UsageStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use pagehub_core::result::AppResult;
use pagehub_database::repositories::{AssetUsageRepository, ContentRepository, MediaRepository};
use pagehub_entity::content::{ContentKind, IndexableContent};
use pagehub_entity::media::MediaItem;
use pagehub_entity::usage::{AssetUsage, NewAssetUsage};

use super::store::UsageStore;

/// Usage store over the media, content and usage repositories.
#[derive(Debug, Clone)]
pub struct PgUsageStore {
    media: MediaRepository,
    content: ContentRepository,
    usages: AssetUsageRepository,
}

impl PgUsageStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            media: MediaRepository::new(pool.clone()),
            content: ContentRepository::new(pool.clone()),
            usages: AssetUsageRepository::new(pool),
        }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn find_media_by_slug(&self, slug: &str) -> AppResult<Option<MediaItem>> {
        self.media.find_by_slug(slug).await
    }

    async fn find_media_by_slug_fragment(&self, fragment: &str) -> AppResult<Option<MediaItem>> {
        self.media.find_by_slug_fragment(fragment).await
    }

    async fn replace_content_usages(
        &self,
        content_id: i64,
        content_type: ContentKind,
        usages: &[NewAssetUsage],
    ) -> AppResult<()> {
        self.usages
            .replace_for_content(content_id, content_type, usages)
            .await
    }

    async fn delete_all_usages(&self) -> AppResult<u64> {
        self.usages.delete_all().await
    }

    async fn list_indexable_content(&self) -> AppResult<Vec<IndexableContent>> {
        self.content.list_indexable().await
    }

    async fn find_indexable_content(
        &self,
        content_type: ContentKind,
        content_id: i64,
    ) -> AppResult<Option<IndexableContent>> {
        self.content.find_indexable(content_type, content_id).await
    }

    async fn usages_for_assets(&self, asset_ids: &[Uuid]) -> AppResult<Vec<AssetUsage>> {
        self.usages.find_by_assets(asset_ids).await
    }
}
