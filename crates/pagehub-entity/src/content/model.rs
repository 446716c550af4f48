//! Page and article entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::ContentKind;

/// A content page.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentPage {
    /// Page identifier.
    pub id: i64,
    /// Page title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Rich-text (HTML) body.
    pub content: String,
    /// Optional gallery grouping key.
    pub gallery_group: Option<String>,
    /// Whether the page is listed in the site menu.
    pub show_in_menu: bool,
    /// When the page was created.
    pub created_at: DateTime<Utc>,
}

/// A published article.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    /// Article identifier.
    pub id: i64,
    /// Article headline.
    pub headline: String,
    /// URL slug.
    pub slug: String,
    /// Rich-text (HTML) body.
    pub content: String,
    /// Publication timestamp.
    pub published_at: DateTime<Utc>,
}

/// The subset of a content item the usage indexer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexableContent {
    /// Content identifier, unique per kind.
    pub id: i64,
    /// Whether this is a page or an article.
    pub kind: ContentKind,
    /// Display title (page title or article headline).
    pub title: String,
    /// Rich-text body to scan.
    pub body: String,
}

impl From<ContentPage> for IndexableContent {
    fn from(page: ContentPage) -> Self {
        Self {
            id: page.id,
            kind: ContentKind::Page,
            title: page.title,
            body: page.content,
        }
    }
}

impl From<Article> for IndexableContent {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            kind: ContentKind::Article,
            title: article.headline,
            body: article.content,
        }
    }
}
