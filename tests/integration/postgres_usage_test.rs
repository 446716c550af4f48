//! Asset usage index against PostgreSQL.
//!
//! Each test returns early unless `DATABASE_URL` points at a scratch database.

mod helpers;

use std::sync::Arc;

use pagehub_core::config::media::MediaConfig;
use pagehub_database::repositories::AssetUsageRepository;
use pagehub_entity::content::ContentKind;
use pagehub_entity::usage::NewAssetUsage;
use pagehub_service::usage::ReferenceScanner;
use pagehub_service::{AssetUsageService, PgUsageStore, RebuildSummary};

use helpers::TestDatabase;

fn service(db: &TestDatabase) -> AssetUsageService {
    let scanner = ReferenceScanner::from_config(&MediaConfig::default()).unwrap();
    AssetUsageService::new(Arc::new(PgUsageStore::new(db.pool().clone())), scanner)
}

#[tokio::test]
async fn test_long_titles_survive_reindex_and_rebuild() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let hero = db.insert_media("hero-5f2a.jpg").await;
    let body = "<img src=\"/uploads/originals/hero-5f2a.jpg\">";

    let long_title = "A very long page title ".repeat(14);
    assert!(long_title.len() > 300);
    let long_page = db.insert_page(&long_title, body).await;
    db.insert_page("Short", body).await;

    let usages = service(&db);
    assert_eq!(usages.reindex(ContentKind::Page, long_page).await.unwrap(), 1);

    let summary = usages.rebuild_all().await.unwrap();
    assert_eq!(
        summary,
        RebuildSummary {
            contents_indexed: 2,
            usages_written: 2,
        }
    );

    let grouped = usages.usages_for_assets(&[hero]).await.unwrap();
    let records = &grouped[&hero];
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|u| u.content_title == long_title));
    assert!(records.iter().any(|u| u.content_title == "Short"));
}

#[tokio::test]
async fn test_replacing_usages_is_idempotent() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let hero = db.insert_media("hero-5f2a.jpg").await;
    let logo = db.insert_media("logo-77aa.png").await;
    let page = db.insert_page("Home", "").await;

    let repo = AssetUsageRepository::new(db.pool().clone());
    let records = vec![
        NewAssetUsage::body_reference(hero, page, ContentKind::Page, "Home"),
        NewAssetUsage::body_reference(logo, page, ContentKind::Page, "Home"),
    ];
    repo.replace_for_content(page, ContentKind::Page, &records)
        .await
        .unwrap();
    repo.replace_for_content(page, ContentKind::Page, &records)
        .await
        .unwrap();

    assert_eq!(db.usage_count().await, 2);
    let stored = repo.find_by_assets(&[hero, logo]).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|u| u.content_type == "Page"));
    assert!(stored.iter().all(|u| u.reference_kind == "BodyHtml"));

    repo.replace_for_content(page, ContentKind::Page, &records[..1])
        .await
        .unwrap();
    let stored = repo.find_by_assets(&[hero, logo]).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].asset_id, hero);
}

#[tokio::test]
async fn test_empty_body_clears_content_usages() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let hero = db.insert_media("hero-5f2a.jpg").await;
    let body = "<img src='/uploads/webp/small/hero-5f2a.webp'>";
    let page = db.insert_page("Home", body).await;
    let article = db.insert_article("Launch", body).await;

    let usages = service(&db);
    usages.index_content(page, ContentKind::Page, body, "Home").await.unwrap();
    usages
        .index_content(article, ContentKind::Article, body, "Launch")
        .await
        .unwrap();
    assert_eq!(db.usage_count().await, 2);

    let written = usages
        .index_content(page, ContentKind::Page, "", "Home")
        .await
        .unwrap();
    assert_eq!(written, 0);

    let grouped = usages.usages_for_assets(&[hero]).await.unwrap();
    assert_eq!(grouped[&hero].len(), 1);
    assert_eq!(grouped[&hero][0].label(), "Article: Launch");
}

#[tokio::test]
async fn test_rebuild_purges_records_of_deleted_content() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let hero = db.insert_media("hero-5f2a.jpg").await;
    let body = "<img src='/uploads/originals/hero-5f2a.jpg'>";
    let kept = db.insert_page("Kept", body).await;
    let removed = db.insert_page("Removed", body).await;

    let usages = service(&db);
    usages.reindex(ContentKind::Page, kept).await.unwrap();
    usages.reindex(ContentKind::Page, removed).await.unwrap();

    sqlx::query("DELETE FROM pages WHERE id = $1")
        .bind(removed)
        .execute(db.pool())
        .await
        .unwrap();
    assert_eq!(db.usage_count().await, 2);

    let summary = usages.rebuild_all().await.unwrap();
    assert_eq!(summary.contents_indexed, 1);
    assert_eq!(summary.usages_written, 1);

    let grouped = usages.usages_for_assets(&[hero]).await.unwrap();
    assert_eq!(grouped[&hero].len(), 1);
    assert_eq!(grouped[&hero][0].content_id, kept);
}
