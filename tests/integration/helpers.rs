//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::PathBuf;

use sqlx::PgPool;
use tempfile::TempDir;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;
use zip::write::SimpleFileOptions;

use pagehub_addon::{AddonInstaller, AddonManager};
use pagehub_core::config::DatabaseConfig;
use pagehub_database::DatabasePool;

/// Builds an in-memory `.zip` package from `(path, contents)` pairs.
pub fn zip_package(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in files {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(body.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Descriptor JSON with every required field.
pub fn descriptor(id: &str, version: &str) -> String {
    serde_json::json!({
        "id": id,
        "name": format!("{id} addon"),
        "description": "Integration test addon",
        "version": version,
        "author": "Test Suite",
    })
    .to_string()
}

/// A valid addon package wrapped in a top-level folder.
pub fn addon_package(id: &str, version: &str) -> Vec<u8> {
    let descriptor = descriptor(id, version);
    let descriptor_path = format!("{id}/addon.json");
    let asset_path = format!("{id}/assets/readme.txt");
    zip_package(&[
        (descriptor_path.as_str(), descriptor.as_str()),
        (asset_path.as_str(), version),
    ])
}

/// Temporary addons root plus scratch directory.
pub struct TestSite {
    _root: TempDir,
    pub addons_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl TestSite {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let addons_dir = root.path().join("addons");
        let scratch_dir = root.path().join("scratch");
        Self {
            _root: root,
            addons_dir,
            scratch_dir,
        }
    }

    pub fn installer(&self) -> AddonInstaller {
        AddonInstaller::new(&self.addons_dir, &self.scratch_dir)
    }

    pub fn manager(&self) -> AddonManager {
        AddonManager::new(&self.addons_dir)
    }

    /// Version recorded in an installed addon's descriptor.
    pub fn installed_version(&self, dir_name: &str) -> Option<String> {
        let raw = std::fs::read(self.addons_dir.join(dir_name).join("addon.json")).ok()?;
        let value: serde_json::Value = serde_json::from_slice(&raw).ok()?;
        value.get("version")?.as_str().map(str::to_string)
    }
}

/// Tests sharing one database run one at a time.
static DATABASE_LOCK: Mutex<()> = Mutex::const_new(());

/// Migrated, emptied Postgres database named by `DATABASE_URL`.
pub struct TestDatabase {
    pub db: DatabasePool,
    _guard: MutexGuard<'static, ()>,
}

impl TestDatabase {
    /// `None` when `DATABASE_URL` is unset.
    pub async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres test");
            return None;
        };
        let guard = DATABASE_LOCK.lock().await;

        let config = DatabaseConfig {
            url,
            max_connections: 2,
            min_connections: 1,
            ..DatabaseConfig::default()
        };
        let db = DatabasePool::connect(&config)
            .await
            .expect("Failed to connect to test database");
        pagehub_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        for table in ["asset_usages", "pages", "articles", "media_items"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(db.pool())
                .await
                .expect("Failed to clean table");
        }

        Some(Self { db, _guard: guard })
    }

    pub fn pool(&self) -> &PgPool {
        self.db.pool()
    }

    pub async fn insert_media(&self, slug: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO media_items (id, filename, slug, original_path) VALUES ($1, $2, $2, $3)",
        )
        .bind(id)
        .bind(slug)
        .bind(format!("/uploads/originals/{slug}"))
        .execute(self.pool())
        .await
        .expect("Failed to insert media item");
        id
    }

    pub async fn insert_page(&self, title: &str, body: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO pages (title, slug, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(title)
        .bind(Uuid::new_v4().to_string())
        .bind(body)
        .fetch_one(self.pool())
        .await
        .expect("Failed to insert page")
    }

    pub async fn insert_article(&self, headline: &str, body: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO articles (headline, slug, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(headline)
        .bind(Uuid::new_v4().to_string())
        .bind(body)
        .fetch_one(self.pool())
        .await
        .expect("Failed to insert article")
    }

    pub async fn usage_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM asset_usages")
            .fetch_one(self.pool())
            .await
            .expect("Failed to count usages")
    }
}
