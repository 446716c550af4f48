//! Reference kind tag for usage records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where inside a content item an asset reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Referenced from the rich-text body.
    #[default]
    BodyHtml,
}

impl ReferenceKind {
    /// Return the persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BodyHtml => "BodyHtml",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
