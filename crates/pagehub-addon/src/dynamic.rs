//! Addons discovered on disk that carry no compiled code.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use pagehub_core::result::AppResult;

use crate::addon::{Addon, AddonIdentity};

/// An addon backed only by its directory and descriptor. It has a lifecycle
/// but no hook listener.
#[derive(Debug, Clone)]
pub struct DescriptorAddon {
    identity: AddonIdentity,
    directory: PathBuf,
}

impl DescriptorAddon {
    pub fn new(identity: AddonIdentity, directory: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl Addon for DescriptorAddon {
    fn identity(&self) -> &AddonIdentity {
        &self.identity
    }

    async fn initialize(&self) -> AppResult<()> {
        info!(
            addon_id = %self.identity.id,
            directory = %self.directory.display(),
            "Descriptor addon initialized"
        );
        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        info!(addon_id = %self.identity.id, "Descriptor addon shut down");
        Ok(())
    }
}
