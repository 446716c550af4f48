//! Storage seam used by the usage indexer.

use async_trait::async_trait;
use uuid::Uuid;

use pagehub_core::result::AppResult;
use pagehub_entity::content::{ContentKind, IndexableContent};
use pagehub_entity::media::MediaItem;
use pagehub_entity::usage::{AssetUsage, NewAssetUsage};

/// Everything the indexer reads from and writes to persistent storage.
#[async_trait]
pub trait UsageStore: Send + Sync + std::fmt::Debug {
    /// Media item whose stored filename equals `slug`.
    async fn find_media_by_slug(&self, slug: &str) -> AppResult<Option<MediaItem>>;

    /// First media item (by slug order) whose stored filename contains `fragment`.
    async fn find_media_by_slug_fragment(&self, fragment: &str) -> AppResult<Option<MediaItem>>;

    /// Atomically replaces every usage of one content item.
    async fn replace_content_usages(
        &self,
        content_id: i64,
        content_type: ContentKind,
        usages: &[NewAssetUsage],
    ) -> AppResult<()>;

    /// Deletes the whole index and returns how many records were removed.
    async fn delete_all_usages(&self) -> AppResult<u64>;

    /// Every page and article.
    async fn list_indexable_content(&self) -> AppResult<Vec<IndexableContent>>;

    async fn find_indexable_content(
        &self,
        content_type: ContentKind,
        content_id: i64,
    ) -> AppResult<Option<IndexableContent>>;

    /// Usage records for the given assets.
    async fn usages_for_assets(&self, asset_ids: &[Uuid]) -> AppResult<Vec<AssetUsage>>;
}
