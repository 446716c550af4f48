//! The fixed catalog of lifecycle points addons can listen to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pagehub_core::error::AppError;

/// Enumeration of all hook points in the system.
///
/// Any component may fire any kind; the catalog does not check that a
/// firing site matches the kind's intended meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    // ── Rendering ──
    /// Fired before the home page is rendered.
    BeforeHomepageRender,
    /// Fired after the home page is rendered.
    AfterHomepageRender,
    /// Fired before a content page is rendered.
    BeforePageRender,
    /// Fired after a content page is rendered.
    AfterPageRender,
    /// Fired before an article is rendered.
    BeforeArticleRender,
    /// Fired after an article is rendered.
    AfterArticleRender,

    // ── Content mutation ──
    /// Fired before an article is saved.
    BeforeArticleSave,
    /// Fired before a page is saved.
    BeforePageSave,
    /// Fired before a media item is saved.
    BeforeMediaSave,
    /// Fired before a media item is deleted.
    BeforeMediaDelete,

    // ── Admin & system ──
    /// Lets addons contribute entries to the admin menu.
    AdminMenuItems,
    /// Fired once when the system has finished starting.
    SystemInitialize,
}

impl HookKind {
    /// Every hook kind, in catalog order.
    pub const ALL: [HookKind; 12] = [
        Self::BeforeHomepageRender,
        Self::AfterHomepageRender,
        Self::BeforePageRender,
        Self::AfterPageRender,
        Self::BeforeArticleRender,
        Self::AfterArticleRender,
        Self::BeforeArticleSave,
        Self::BeforePageSave,
        Self::BeforeMediaSave,
        Self::BeforeMediaDelete,
        Self::AdminMenuItems,
        Self::SystemInitialize,
    ];

    /// Returns the string name of this hook kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeHomepageRender => "before_homepage_render",
            Self::AfterHomepageRender => "after_homepage_render",
            Self::BeforePageRender => "before_page_render",
            Self::AfterPageRender => "after_page_render",
            Self::BeforeArticleRender => "before_article_render",
            Self::AfterArticleRender => "after_article_render",
            Self::BeforeArticleSave => "before_article_save",
            Self::BeforePageSave => "before_page_save",
            Self::BeforeMediaSave => "before_media_save",
            Self::BeforeMediaDelete => "before_media_delete",
            Self::AdminMenuItems => "admin_menu_items",
            Self::SystemInitialize => "system_initialize",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown hook kind: '{s}'")))
    }
}
