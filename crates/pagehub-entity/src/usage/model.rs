//! Asset usage entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::reference::ReferenceKind;
use crate::content::kind::ContentKind;

/// One observed reference from a content item to a media asset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssetUsage {
    /// Row identifier.
    pub id: i64,
    /// The referenced media item.
    pub asset_id: Uuid,
    /// The referencing content item.
    pub content_id: i64,
    /// Content type tag (`"Page"`, `"Article"`).
    pub content_type: String,
    /// Content title cached for display.
    pub content_title: String,
    /// Reference kind tag (`"BodyHtml"`, ...).
    pub reference_kind: String,
    /// When the reference was last observed.
    pub last_seen_at: DateTime<Utc>,
}

impl AssetUsage {
    /// Human-readable label, e.g. `Page: About us`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.content_type, self.content_title)
    }
}

/// Data required to insert a new usage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssetUsage {
    /// The referenced media item.
    pub asset_id: Uuid,
    /// The referencing content item.
    pub content_id: i64,
    /// The referencing content kind.
    pub content_type: ContentKind,
    /// Content title cached for display.
    pub content_title: String,
    /// Where the reference was found.
    pub reference_kind: ReferenceKind,
    /// When the reference was observed.
    pub last_seen_at: DateTime<Utc>,
}

impl NewAssetUsage {
    /// Create a body-content usage observed now.
    pub fn body_reference(
        asset_id: Uuid,
        content_id: i64,
        content_type: ContentKind,
        content_title: &str,
    ) -> Self {
        Self {
            asset_id,
            content_id,
            content_type,
            content_title: content_title.to_string(),
            reference_kind: ReferenceKind::default(),
            last_seen_at: Utc::now(),
        }
    }
}
