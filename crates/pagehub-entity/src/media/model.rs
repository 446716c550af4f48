//! Media item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored media item (asset) in the media library.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaItem {
    /// Unique asset identifier.
    pub id: Uuid,
    /// Original upload filename.
    pub filename: String,
    /// Stored filename, unique across the library (e.g. `cat-3f2a9c.jpg`).
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Alternative text for accessibility.
    pub alt_text: Option<String>,
    /// Optional long description.
    pub description: Option<String>,
    /// Public path of the original file.
    pub original_path: String,
    /// Public path of the small WebP variant.
    pub webp_small: Option<String>,
    /// Public path of the medium WebP variant.
    pub webp_medium: Option<String>,
    /// Public path of the large WebP variant.
    pub webp_large: Option<String>,
    /// Optional gallery grouping key.
    pub gallery_group: Option<String>,
    /// When the item was uploaded.
    pub uploaded_at: DateTime<Utc>,
}
