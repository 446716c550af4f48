//! Content type tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of content whose bodies can reference media assets.
///
/// Persisted as a text tag (`"Page"` / `"Article"`) in usage records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// A standalone content page.
    Page,
    /// A news/blog article.
    Article,
}

impl ContentKind {
    /// All content kinds, in rebuild order.
    pub const ALL: [ContentKind; 2] = [Self::Page, Self::Article];

    /// Return the persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "Page",
            Self::Article => "Article",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = pagehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "page" => Ok(Self::Page),
            "article" => Ok(Self::Article),
            _ => Err(pagehub_core::AppError::validation(format!(
                "Invalid content type: '{s}'. Expected one of: page, article"
            ))),
        }
    }
}
