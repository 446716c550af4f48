//! Capability traits every addon implements.
//!
//! An addon always has an identity and a lifecycle; listening to hooks is an
//! optional facet exposed through [`Addon::hook_listener`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pagehub_core::result::AppResult;

use crate::hooks::{HookEvent, HookKind};

/// Identity fields shared by descriptors on disk and compiled-in addons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonIdentity {
    /// Reverse-domain style unique id, e.g. `com.pagehub.watermark`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Semantic version string.
    pub version: String,
    /// Author or maintainer.
    pub author: String,
}

impl AddonIdentity {
    /// Creates an identity; description starts empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            version: version.into(),
            author: author.into(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Snapshot of one registered addon as seen by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonDescriptor {
    /// Identity fields.
    #[serde(flatten)]
    pub identity: AddonIdentity,
    /// Hook kinds the addon listens to, in declaration order.
    pub supported_hooks: Vec<HookKind>,
    /// Runtime enabled flag.
    pub enabled: bool,
}

impl AddonDescriptor {
    /// Shortcut for `identity.id`.
    pub fn id(&self) -> &str {
        &self.identity.id
    }

    /// Returns whether the addon declares `kind`.
    pub fn supports(&self, kind: HookKind) -> bool {
        self.supported_hooks.contains(&kind)
    }
}

/// A unit of pluggable behavior.
#[async_trait]
pub trait Addon: Send + Sync + std::fmt::Debug {
    /// Returns the addon's identity.
    fn identity(&self) -> &AddonIdentity;

    /// Called when the addon transitions to enabled.
    async fn initialize(&self) -> AppResult<()> {
        Ok(())
    }

    /// Called when the addon transitions to disabled.
    async fn shutdown(&self) -> AppResult<()> {
        Ok(())
    }

    /// Returns the hook listener facet, if the addon has one.
    fn hook_listener(&self) -> Option<&dyn HookListener> {
        None
    }
}

/// Optional facet for addons that react to hook events.
#[async_trait]
pub trait HookListener: Send + Sync {
    /// Hook kinds this listener wants to receive.
    fn supported_hooks(&self) -> &[HookKind];

    /// Handles one event. Payload changes are seen by later listeners.
    async fn on_hook(&self, event: &mut HookEvent) -> AppResult<()>;
}
