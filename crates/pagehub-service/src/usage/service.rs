//! Asset usage indexer.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pagehub_core::error::AppError;
use pagehub_core::result::AppResult;
use pagehub_entity::content::ContentKind;
use pagehub_entity::media::MediaItem;
use pagehub_entity::usage::{AssetUsage, NewAssetUsage};

use super::scanner::{ReferenceScanner, strip_extension};
use super::store::UsageStore;

/// Result of a full rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    /// Content items that were indexed.
    pub contents_indexed: usize,
    /// Usage records written across all items.
    pub usages_written: usize,
}

/// Maintains the reverse index from media assets to the content that
/// references them.
///
/// Each per-item reindex replaces that item's whole record set, so calling
/// it repeatedly with the same input is idempotent. Records of content that
/// disappeared without a reindex are only purged by [`rebuild_all`].
///
/// [`rebuild_all`]: AssetUsageService::rebuild_all
#[derive(Debug, Clone)]
pub struct AssetUsageService {
    store: Arc<dyn UsageStore>,
    scanner: ReferenceScanner,
}

impl AssetUsageService {
    /// Creates a new asset usage service.
    pub fn new(store: Arc<dyn UsageStore>, scanner: ReferenceScanner) -> Self {
        Self { store, scanner }
    }

    /// Rewrites the usage records of one content item from its body.
    ///
    /// Returns the number of records written. An empty body only clears.
    pub async fn index_content(
        &self,
        content_id: i64,
        content_type: ContentKind,
        body: &str,
        title: &str,
    ) -> AppResult<usize> {
        let mut usages: Vec<NewAssetUsage> = Vec::new();

        if !body.is_empty() {
            for candidate in self.scanner.scan(body) {
                let Some(media) = self.resolve(&candidate).await? else {
                    debug!(candidate = %candidate, "Reference does not match any media item");
                    continue;
                };
                if usages.iter().any(|u| u.asset_id == media.id) {
                    continue;
                }
                usages.push(NewAssetUsage::body_reference(
                    media.id,
                    content_id,
                    content_type,
                    title,
                ));
            }
        }

        self.store
            .replace_content_usages(content_id, content_type, &usages)
            .await?;

        debug!(
            content_id,
            content_type = %content_type,
            asset_count = usages.len(),
            "Indexed content"
        );
        Ok(usages.len())
    }

    /// Loads one content item and reindexes it.
    pub async fn reindex(&self, content_type: ContentKind, content_id: i64) -> AppResult<usize> {
        let content = self
            .store
            .find_indexable_content(content_type, content_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("{content_type} {content_id} not found"))
            })?;

        self.index_content(content.id, content.kind, &content.body, &content.title)
            .await
    }

    /// Clears the whole index, then reindexes every content item.
    ///
    /// The clear and each item's reindex commit separately; an interrupted
    /// rebuild leaves a consistent but incomplete index that the next
    /// rebuild completes.
    pub async fn rebuild_all(&self) -> AppResult<RebuildSummary> {
        let removed = self.store.delete_all_usages().await?;
        info!(removed, "Cleared asset usage index");

        let contents = self.store.list_indexable_content().await?;
        let mut summary = RebuildSummary::default();

        for content in &contents {
            let written = self
                .index_content(content.id, content.kind, &content.body, &content.title)
                .await
                .map_err(|e| {
                    warn!(
                        content_id = content.id,
                        content_type = %content.kind,
                        error = %e,
                        "Rebuild stopped"
                    );
                    e
                })?;
            summary.contents_indexed += 1;
            summary.usages_written += written;
        }

        info!(
            contents_indexed = summary.contents_indexed,
            usages_written = summary.usages_written,
            "Rebuilt asset usage index"
        );
        Ok(summary)
    }

    /// Usage records for each requested asset. Every requested id is present
    /// in the map, with an empty list when unused.
    pub async fn usages_for_assets(
        &self,
        asset_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<AssetUsage>>> {
        let mut grouped: HashMap<Uuid, Vec<AssetUsage>> =
            asset_ids.iter().map(|id| (*id, Vec::new())).collect();
        if asset_ids.is_empty() {
            return Ok(grouped);
        }

        for usage in self.store.usages_for_assets(asset_ids).await? {
            grouped.entry(usage.asset_id).or_default().push(usage);
        }
        Ok(grouped)
    }

    /// Exact slug first; otherwise the extension-less name as a slug
    /// fragment, since WebP variants swap the original extension.
    async fn resolve(&self, candidate: &str) -> AppResult<Option<MediaItem>> {
        if let Some(media) = self.store.find_media_by_slug(candidate).await? {
            return Ok(Some(media));
        }
        let stem = strip_extension(candidate);
        if stem.is_empty() {
            return Ok(None);
        }
        self.store.find_media_by_slug_fragment(stem).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::memory::MemoryUsageStore;
    use pagehub_core::error::ErrorKind;
    use pagehub_entity::content::IndexableContent;

    fn service(store: &Arc<MemoryUsageStore>) -> AssetUsageService {
        AssetUsageService::new(
            store.clone(),
            ReferenceScanner::new("/uploads", &["small", "medium", "large"]).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_variant_url_resolves_and_is_idempotent() {
        let store = Arc::new(MemoryUsageStore::new());
        let cat = store.add_media("cat-abc123.jpg").await;
        let svc = service(&store);
        let body = "<img src='/uploads/webp/small/cat-abc123.webp'>";

        assert_eq!(svc.index_content(1, ContentKind::Page, body, "T").await.unwrap(), 1);
        assert_eq!(svc.index_content(1, ContentKind::Page, body, "T").await.unwrap(), 1);

        let usages = store.all_usages().await;
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].asset_id, cat.id);
        assert_eq!(usages[0].content_type, "Page");
        assert_eq!(usages[0].content_title, "T");
        assert_eq!(usages[0].reference_kind, "BodyHtml");
    }

    #[tokio::test]
    async fn test_same_asset_through_several_urls_counts_once() {
        let store = Arc::new(MemoryUsageStore::new());
        store.add_media("cat-abc123.jpg").await;
        let dog = store.add_media("dog-ff00.png").await;
        let svc = service(&store);
        let body = r#"
            <img src="/uploads/originals/cat-abc123.jpg">
            <img src="/uploads/webp/large/cat-abc123.webp">
            <img src="/uploads/webp/medium/dog-ff00.webp">
            <img src="/uploads/originals/missing-000.jpg">
        "#;

        assert_eq!(svc.index_content(7, ContentKind::Article, body, "News").await.unwrap(), 2);
        let grouped = svc.usages_for_assets(&[dog.id]).await.unwrap();
        assert_eq!(grouped[&dog.id].len(), 1);
        assert_eq!(grouped[&dog.id][0].content_id, 7);
    }

    #[tokio::test]
    async fn test_empty_body_clears_previous_records() {
        let store = Arc::new(MemoryUsageStore::new());
        store.add_media("cat-abc123.jpg").await;
        let svc = service(&store);

        svc.index_content(1, ContentKind::Page, "/uploads/originals/cat-abc123.jpg", "T")
            .await
            .unwrap();
        svc.index_content(1, ContentKind::Article, "/uploads/originals/cat-abc123.jpg", "A")
            .await
            .unwrap();
        assert_eq!(svc.index_content(1, ContentKind::Page, "", "T").await.unwrap(), 0);

        let usages = store.all_usages().await;
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].content_type, "Article");
    }

    #[tokio::test]
    async fn test_rebuild_purges_orphans() {
        let store = Arc::new(MemoryUsageStore::new());
        store.add_media("cat-abc123.jpg").await;
        let body = "<img src=\"/uploads/originals/cat-abc123.jpg\">";
        store
            .put_content(IndexableContent {
                id: 1,
                kind: ContentKind::Page,
                title: "Keep".into(),
                body: body.into(),
            })
            .await;
        store
            .put_content(IndexableContent {
                id: 2,
                kind: ContentKind::Page,
                title: "Gone".into(),
                body: body.into(),
            })
            .await;
        let svc = service(&store);
        svc.rebuild_all().await.unwrap();
        assert_eq!(store.all_usages().await.len(), 2);

        store.remove_content(ContentKind::Page, 2).await;
        svc.reindex(ContentKind::Page, 1).await.unwrap();
        assert_eq!(store.all_usages().await.len(), 2);

        let summary = svc.rebuild_all().await.unwrap();
        assert_eq!(
            summary,
            RebuildSummary {
                contents_indexed: 1,
                usages_written: 1
            }
        );
        let usages = store.all_usages().await;
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].content_title, "Keep");
    }

    #[tokio::test]
    async fn test_reindex_unknown_content_is_not_found() {
        let store = Arc::new(MemoryUsageStore::new());
        let err = service(&store)
            .reindex(ContentKind::Article, 99)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_usages_for_unused_asset_is_empty() {
        let store = Arc::new(MemoryUsageStore::new());
        let unused = store.add_media("lonely-1.jpg").await;
        let grouped = service(&store).usages_for_assets(&[unused.id]).await.unwrap();
        assert!(grouped[&unused.id].is_empty());
    }
}
