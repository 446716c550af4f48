//! Keeps an in-memory trail of content mutations.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use async_trait::async_trait;
use pagehub_core::result::AppResult;

use crate::addon::{Addon, AddonIdentity, HookListener};
use crate::hooks::{HookEvent, HookKind};

/// Addon id.
pub const ACTIVITY_LOG_ADDON_ID: &str = "com.pagehub.activitylog";

/// Oldest entries are dropped past this size.
const MAX_ENTRIES: usize = 500;

const HOOKS: [HookKind; 5] = [
    HookKind::BeforePageSave,
    HookKind::BeforeArticleSave,
    HookKind::BeforeMediaSave,
    HookKind::BeforeMediaDelete,
    HookKind::SystemInitialize,
];

/// One logged event.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub hook: HookKind,
    pub user_id: Option<String>,
    pub subject: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ActivityLogAddon {
    identity: AddonIdentity,
    entries: Mutex<VecDeque<ActivityEntry>>,
}

impl ActivityLogAddon {
    pub fn new() -> Self {
        Self {
            identity: AddonIdentity::new(
                ACTIVITY_LOG_ADDON_ID,
                "Activity Log",
                "1.0.0",
                "PageHub Team",
            )
            .with_description("Records who changed which page, article or media item"),
            entries: Mutex::new(VecDeque::with_capacity(MAX_ENTRIES)),
        }
    }

    /// Snapshot of recorded entries, oldest first.
    pub async fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }
}

impl Default for ActivityLogAddon {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks a human-readable subject out of the payload.
fn subject_of(event: &HookEvent) -> Option<String> {
    event
        .get_string("title")
        .or_else(|| event.get_string("headline"))
        .or_else(|| event.get_nested_string("media", "filename"))
        .map(str::to_string)
}

#[async_trait]
impl Addon for ActivityLogAddon {
    fn identity(&self) -> &AddonIdentity {
        &self.identity
    }

    async fn shutdown(&self) -> AppResult<()> {
        let recorded = self.entries.lock().await.len();
        info!(addon_id = ACTIVITY_LOG_ADDON_ID, recorded, "Activity log closed");
        Ok(())
    }

    fn hook_listener(&self) -> Option<&dyn HookListener> {
        Some(self)
    }
}

#[async_trait]
impl HookListener for ActivityLogAddon {
    fn supported_hooks(&self) -> &[HookKind] {
        &HOOKS
    }

    async fn on_hook(&self, event: &mut HookEvent) -> AppResult<()> {
        let entry = ActivityEntry {
            hook: event.kind,
            user_id: event.user_id.clone(),
            subject: subject_of(event),
            recorded_at: event.fired_at,
        };
        info!(
            hook = %entry.hook,
            user_id = entry.user_id.as_deref().unwrap_or("-"),
            subject = entry.subject.as_deref().unwrap_or("-"),
            "Activity"
        );

        let mut entries = self.entries.lock().await;
        if entries.len() == MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(())
    }
}
