//! Media library repository.

use sqlx::PgPool;

use pagehub_core::error::{AppError, ErrorKind};
use pagehub_core::result::AppResult;
use pagehub_entity::media::MediaItem;

/// Read access to the media library.
#[derive(Debug, Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    /// Create a new media repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a media item whose stored filename equals `slug`.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<MediaItem>> {
        sqlx::query_as::<_, MediaItem>("SELECT * FROM media_items WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find media item by slug", e)
            })
    }

    /// Find the first media item whose stored filename contains `fragment`.
    ///
    /// `strpos` keeps `%` and `_` in the fragment literal.
    pub async fn find_by_slug_fragment(&self, fragment: &str) -> AppResult<Option<MediaItem>> {
        sqlx::query_as::<_, MediaItem>(
            "SELECT * FROM media_items WHERE strpos(slug, $1) > 0 ORDER BY slug ASC LIMIT 1",
        )
        .bind(fragment)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to search media item by slug", e)
        })
    }
}
