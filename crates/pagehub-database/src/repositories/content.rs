//! Page and article repository.

use sqlx::PgPool;

use pagehub_core::error::{AppError, ErrorKind};
use pagehub_core::result::AppResult;
use pagehub_entity::content::{Article, ContentKind, ContentPage, IndexableContent};

/// Read access to pages and articles.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    /// Create a new content repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every page ordered by ID.
    pub async fn list_pages(&self) -> AppResult<Vec<ContentPage>> {
        sqlx::query_as::<_, ContentPage>("SELECT * FROM pages ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list pages", e))
    }

    /// List every article ordered by ID.
    pub async fn list_articles(&self) -> AppResult<Vec<Article>> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list articles", e))
    }

    /// Find a single page or article in its indexable form.
    pub async fn find_indexable(
        &self,
        kind: ContentKind,
        id: i64,
    ) -> AppResult<Option<IndexableContent>> {
        match kind {
            ContentKind::Page => {
                sqlx::query_as::<_, ContentPage>("SELECT * FROM pages WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map(|row| row.map(IndexableContent::from))
                    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find page", e))
            }
            ContentKind::Article => {
                sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map(|row| row.map(IndexableContent::from))
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to find article", e)
                    })
            }
        }
    }

    /// List every page, then every article, in indexable form.
    pub async fn list_indexable(&self) -> AppResult<Vec<IndexableContent>> {
        let mut items: Vec<IndexableContent> = self
            .list_pages()
            .await?
            .into_iter()
            .map(IndexableContent::from)
            .collect();
        items.extend(
            self.list_articles()
                .await?
                .into_iter()
                .map(IndexableContent::from),
        );
        Ok(items)
    }
}
