//! In-memory [`UsageStore`] for tests and tooling without a database.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use pagehub_core::result::AppResult;
use pagehub_entity::content::{ContentKind, IndexableContent};
use pagehub_entity::media::MediaItem;
use pagehub_entity::usage::{AssetUsage, NewAssetUsage};

use super::store::UsageStore;

#[derive(Debug, Default)]
struct State {
    media: Vec<MediaItem>,
    content: Vec<IndexableContent>,
    usages: Vec<AssetUsage>,
    next_usage_id: i64,
}

/// Usage store that keeps media, content and usage records in memory.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    state: RwLock<State>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a media item with the given stored filename and returns it.
    pub async fn add_media(&self, slug: &str) -> MediaItem {
        let item = MediaItem {
            id: Uuid::new_v4(),
            filename: slug.to_string(),
            slug: slug.to_string(),
            title: slug.to_string(),
            alt_text: None,
            description: None,
            original_path: format!("/uploads/originals/{slug}"),
            webp_small: None,
            webp_medium: None,
            webp_large: None,
            gallery_group: None,
            uploaded_at: Utc::now(),
        };
        self.state.write().await.media.push(item.clone());
        item
    }

    /// Inserts or replaces a content item.
    pub async fn put_content(&self, content: IndexableContent) {
        let mut state = self.state.write().await;
        state
            .content
            .retain(|c| !(c.id == content.id && c.kind == content.kind));
        state.content.push(content);
    }

    /// Removes a content item without touching its usage records, the way
    /// an out-of-band data edit would.
    pub async fn remove_content(&self, kind: ContentKind, id: i64) -> bool {
        let mut state = self.state.write().await;
        let before = state.content.len();
        state.content.retain(|c| !(c.id == id && c.kind == kind));
        state.content.len() != before
    }

    /// Every stored usage record, in insertion order.
    pub async fn all_usages(&self) -> Vec<AssetUsage> {
        self.state.read().await.usages.clone()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn find_media_by_slug(&self, slug: &str) -> AppResult<Option<MediaItem>> {
        let state = self.state.read().await;
        Ok(state.media.iter().find(|m| m.slug == slug).cloned())
    }

    async fn find_media_by_slug_fragment(&self, fragment: &str) -> AppResult<Option<MediaItem>> {
        let state = self.state.read().await;
        Ok(state
            .media
            .iter()
            .filter(|m| m.slug.contains(fragment))
            .min_by(|a, b| a.slug.cmp(&b.slug))
            .cloned())
    }

    async fn replace_content_usages(
        &self,
        content_id: i64,
        content_type: ContentKind,
        usages: &[NewAssetUsage],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let tag = content_type.as_str();
        state
            .usages
            .retain(|u| !(u.content_id == content_id && u.content_type == tag));

        for usage in usages {
            state.next_usage_id += 1;
            let id = state.next_usage_id;
            state.usages.push(AssetUsage {
                id,
                asset_id: usage.asset_id,
                content_id: usage.content_id,
                content_type: usage.content_type.as_str().to_string(),
                content_title: usage.content_title.clone(),
                reference_kind: usage.reference_kind.as_str().to_string(),
                last_seen_at: usage.last_seen_at,
            });
        }
        Ok(())
    }

    async fn delete_all_usages(&self) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let removed = state.usages.len() as u64;
        state.usages.clear();
        Ok(removed)
    }

    async fn list_indexable_content(&self) -> AppResult<Vec<IndexableContent>> {
        let state = self.state.read().await;
        let mut items = state.content.clone();
        items.sort_by_key(|c| (c.kind != ContentKind::Page, c.id));
        Ok(items)
    }

    async fn find_indexable_content(
        &self,
        content_type: ContentKind,
        content_id: i64,
    ) -> AppResult<Option<IndexableContent>> {
        let state = self.state.read().await;
        Ok(state
            .content
            .iter()
            .find(|c| c.id == content_id && c.kind == content_type)
            .cloned())
    }

    async fn usages_for_assets(&self, asset_ids: &[Uuid]) -> AppResult<Vec<AssetUsage>> {
        let state = self.state.read().await;
        Ok(state
            .usages
            .iter()
            .filter(|u| asset_ids.contains(&u.asset_id))
            .cloned()
            .collect())
    }
}
