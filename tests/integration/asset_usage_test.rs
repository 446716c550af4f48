//! Integration tests for the asset usage index over an in-memory store.

use std::sync::Arc;

use pagehub_core::config::media::MediaConfig;
use pagehub_entity::content::{ContentKind, IndexableContent};
use pagehub_service::usage::ReferenceScanner;
use pagehub_service::{AssetUsageService, MemoryUsageStore, RebuildSummary};

struct Library {
    store: Arc<MemoryUsageStore>,
    service: AssetUsageService,
}

fn library() -> Library {
    let store = Arc::new(MemoryUsageStore::new());
    let scanner = ReferenceScanner::from_config(&MediaConfig::default()).unwrap();
    let service = AssetUsageService::new(store.clone(), scanner);
    Library { store, service }
}

fn content(kind: ContentKind, id: i64, title: &str, body: &str) -> IndexableContent {
    IndexableContent {
        id,
        kind,
        title: title.to_string(),
        body: body.to_string(),
    }
}

/// Stores the content and reindexes it, the way a save handler does.
async fn save(lib: &Library, item: IndexableContent) -> usize {
    let (kind, id) = (item.kind, item.id);
    lib.store.put_content(item).await;
    lib.service.reindex(kind, id).await.unwrap()
}

#[tokio::test]
async fn test_saving_content_tracks_each_referenced_asset() {
    let lib = library();
    let hero = lib.store.add_media("hero-5f2a.jpg").await;
    let logo = lib.store.add_media("logo-77aa.png").await;
    let unused = lib.store.add_media("spare-0001.gif").await;

    let body = r#"
        <p><img src="/uploads/originals/hero-5f2a.jpg" alt="Hero"></p>
        <picture><source srcset="/uploads/webp/medium/logo-77aa.webp"></picture>
    "#;
    assert_eq!(save(&lib, content(ContentKind::Page, 1, "Home", body)).await, 2);

    let grouped = lib
        .service
        .usages_for_assets(&[hero.id, logo.id, unused.id])
        .await
        .unwrap();
    assert_eq!(grouped.len(), 3);
    assert_eq!(grouped[&hero.id][0].label(), "Page: Home");
    assert_eq!(grouped[&logo.id][0].content_id, 1);
    assert!(grouped[&unused.id].is_empty());
}

#[tokio::test]
async fn test_editing_content_replaces_its_records() {
    let lib = library();
    let hero = lib.store.add_media("hero-5f2a.jpg").await;
    let logo = lib.store.add_media("logo-77aa.png").await;

    let before = "<img src='/uploads/originals/hero-5f2a.jpg'>";
    let after = "<img src='/uploads/webp/small/logo-77aa.webp'>";
    save(&lib, content(ContentKind::Article, 4, "Launch", before)).await;
    save(&lib, content(ContentKind::Article, 4, "Launch (updated)", after)).await;

    let grouped = lib
        .service
        .usages_for_assets(&[hero.id, logo.id])
        .await
        .unwrap();
    assert!(grouped[&hero.id].is_empty());
    assert_eq!(grouped[&logo.id].len(), 1);
    assert_eq!(grouped[&logo.id][0].content_title, "Launch (updated)");
    assert_eq!(lib.store.all_usages().await.len(), 1);
}

#[tokio::test]
async fn test_pages_and_articles_with_same_id_are_indexed_apart() {
    let lib = library();
    let hero = lib.store.add_media("hero-5f2a.jpg").await;
    let body = "/uploads/originals/hero-5f2a.jpg";

    save(&lib, content(ContentKind::Page, 9, "About", body)).await;
    save(&lib, content(ContentKind::Article, 9, "Story", body)).await;
    save(&lib, content(ContentKind::Page, 9, "About", "")).await;

    let grouped = lib.service.usages_for_assets(&[hero.id]).await.unwrap();
    assert_eq!(grouped[&hero.id].len(), 1);
    assert_eq!(grouped[&hero.id][0].content_type, "Article");
}

#[tokio::test]
async fn test_rebuild_matches_incremental_index_and_drops_stale_records() {
    let lib = library();
    lib.store.add_media("hero-5f2a.jpg").await;
    lib.store.add_media("logo-77aa.png").await;

    save(
        &lib,
        content(
            ContentKind::Page,
            1,
            "Home",
            "/uploads/originals/hero-5f2a.jpg /uploads/webp/large/logo-77aa.webp",
        ),
    )
    .await;
    save(
        &lib,
        content(ContentKind::Article, 2, "News", "/uploads/originals/logo-77aa.png"),
    )
    .await;
    save(&lib, content(ContentKind::Article, 3, "Draft", "no images")).await;

    let incremental = lib.store.all_usages().await.len();
    let summary = lib.service.rebuild_all().await.unwrap();
    assert_eq!(
        summary,
        RebuildSummary {
            contents_indexed: 3,
            usages_written: incremental
        }
    );

    lib.store.remove_content(ContentKind::Article, 2).await;
    let summary = lib.service.rebuild_all().await.unwrap();
    assert_eq!(summary.contents_indexed, 2);
    assert_eq!(summary.usages_written, 2);
    assert!(lib
        .store
        .all_usages()
        .await
        .iter()
        .all(|u| u.content_id == 1));
}

#[tokio::test]
async fn test_rebuild_of_empty_library_is_a_no_op() {
    let lib = library();
    assert_eq!(
        lib.service.rebuild_all().await.unwrap(),
        RebuildSummary::default()
    );
}
