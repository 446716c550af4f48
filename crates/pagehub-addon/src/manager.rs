//! Addon runtime: registration, lifecycle and hook dispatch.
//!
//! Per addon the state machine is `Registered (disabled) -> Enabled <-> Disabled`.
//! Registration order is kept and is the order listeners are invoked in.
//! A failing or panicking addon is logged and reported, and never stops
//! the remaining addons from running.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use pagehub_core::error::AppError;
use pagehub_core::result::AppResult;

use crate::addon::{Addon, AddonDescriptor};
use crate::descriptor::PackageDescriptor;
use crate::dynamic::DescriptorAddon;
use crate::hooks::{HookEvent, HookKind};

/// Outcome of a dispatch or of a bulk lifecycle call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    /// Number of addons that were called.
    pub invoked: usize,
    /// `(addon_id, message)` for every addon that failed.
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    /// Returns `true` when no addon failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns whether `addon_id` is among the failures.
    pub fn has_failed(&self, addon_id: &str) -> bool {
        self.failed.iter().any(|(id, _)| id == addon_id)
    }
}

#[derive(Debug)]
struct AddonEntry {
    addon: Arc<dyn Addon>,
    supported_hooks: Vec<HookKind>,
    enabled: bool,
}

impl AddonEntry {
    fn id(&self) -> &str {
        &self.addon.identity().id
    }

    fn descriptor(&self) -> AddonDescriptor {
        AddonDescriptor {
            identity: self.addon.identity().clone(),
            supported_hooks: self.supported_hooks.clone(),
            enabled: self.enabled,
        }
    }
}

/// Owns every registered addon for the lifetime of the process.
#[derive(Debug)]
pub struct AddonManager {
    directory: PathBuf,
    entries: RwLock<Vec<AddonEntry>>,
}

impl AddonManager {
    /// Creates a manager that loads addons from `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// The addons root this manager scans.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Scans the addons root and registers one [`DescriptorAddon`] per
    /// subdirectory holding a readable `addon.json`.
    ///
    /// Subdirectories without a descriptor are skipped. Returns the number of
    /// newly registered addons.
    pub async fn load(&self) -> AppResult<usize> {
        if !tokio::fs::try_exists(&self.directory).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&self.directory).await?;
            info!(directory = %self.directory.display(), "Created addons directory");
            return Ok(0);
        }

        let mut dirs = Vec::new();
        let mut reader = tokio::fs::read_dir(&self.directory).await?;
        while let Some(entry) = reader.next_entry().await? {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut registered = 0;
        for dir in dirs {
            let dir_name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let descriptor = match PackageDescriptor::read_from_dir(&dir).await {
                Ok(Some(descriptor)) => descriptor,
                Ok(None) => {
                    debug!(directory = %dir.display(), "No descriptor, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(directory = %dir.display(), error = %e, "Unreadable addon descriptor, skipping");
                    continue;
                }
            };

            let identity = descriptor.into_identity(&dir_name);
            if self
                .register(Arc::new(DescriptorAddon::new(identity, dir)))
                .await
            {
                registered += 1;
            }
        }

        info!(
            directory = %self.directory.display(),
            registered,
            "Addons loaded"
        );
        Ok(registered)
    }

    /// Registers an addon in the disabled state.
    ///
    /// Returns `false` and keeps the existing entry when the id is taken.
    pub async fn register(&self, addon: Arc<dyn Addon>) -> bool {
        let identity = addon.identity().clone();
        let supported_hooks = addon
            .hook_listener()
            .map(|l| l.supported_hooks().to_vec())
            .unwrap_or_default();

        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.id() == identity.id) {
            warn!(
                addon_id = %identity.id,
                name = %identity.name,
                "Duplicate addon id, keeping the first registration"
            );
            return false;
        }

        info!(
            addon_id = %identity.id,
            name = %identity.name,
            version = %identity.version,
            hooks = supported_hooks.len(),
            "Registered addon"
        );
        entries.push(AddonEntry {
            addon,
            supported_hooks,
            enabled: false,
        });
        true
    }

    /// Runs the addon's `initialize` and marks it enabled on success.
    pub async fn enable(&self, id: &str) -> AppResult<()> {
        let addon = self.lookup(id).await?;
        if let Err(message) = guarded(addon.initialize()).await {
            error!(addon_id = %id, error = %message, "Addon failed to initialize");
            return Err(AppError::plugin(format!(
                "Addon '{id}' failed to initialize: {message}"
            )));
        }
        self.set_enabled(id, true).await;
        info!(addon_id = %id, "Addon enabled");
        Ok(())
    }

    /// Runs the addon's `shutdown` and marks it disabled on success.
    pub async fn disable(&self, id: &str) -> AppResult<()> {
        let addon = self.lookup(id).await?;
        if let Err(message) = guarded(addon.shutdown()).await {
            error!(addon_id = %id, error = %message, "Addon failed to shut down");
            return Err(AppError::plugin(format!(
                "Addon '{id}' failed to shut down: {message}"
            )));
        }
        self.set_enabled(id, false).await;
        info!(addon_id = %id, "Addon disabled");
        Ok(())
    }

    /// Sets the enabled flag without running any lifecycle method.
    ///
    /// Used by the host to carry on-disk enabled markers into the runtime
    /// before [`initialize_all`](Self::initialize_all).
    pub async fn mark_enabled(&self, id: &str) -> AppResult<()> {
        if self.set_enabled(id, true).await {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Addon '{id}' not found")))
        }
    }

    /// Calls every enabled listener of `event.kind` in registration order,
    /// handing each the same event.
    pub async fn dispatch(&self, event: &mut HookEvent) -> DispatchReport {
        let targets: Vec<Arc<dyn Addon>> = {
            let entries = self.entries.read().await;
            entries
                .iter()
                .filter(|e| e.enabled && e.supported_hooks.contains(&event.kind))
                .map(|e| e.addon.clone())
                .collect()
        };

        let mut report = DispatchReport::default();
        if targets.is_empty() {
            return report;
        }

        debug!(hook = %event.kind, listeners = targets.len(), "Dispatching hook");

        for addon in targets {
            let Some(listener) = addon.hook_listener() else {
                continue;
            };
            let id = &addon.identity().id;
            report.invoked += 1;

            if let Err(message) = guarded(listener.on_hook(event)).await {
                error!(
                    addon_id = %id,
                    hook = %event.kind,
                    error = %message,
                    "Hook listener failed"
                );
                report.failed.push((id.clone(), message));
            }
        }

        report
    }

    /// Initializes every enabled addon. An addon that fails is flipped back
    /// to disabled.
    pub async fn initialize_all(&self) -> DispatchReport {
        let targets = self.snapshot(true).await;
        let mut report = DispatchReport::default();

        for addon in targets {
            let id = addon.identity().id.clone();
            report.invoked += 1;
            if let Err(message) = guarded(addon.initialize()).await {
                error!(addon_id = %id, error = %message, "Addon failed to initialize");
                self.set_enabled(&id, false).await;
                report.failed.push((id, message));
            }
        }

        info!(
            initialized = report.invoked - report.failed.len(),
            failed = report.failed.len(),
            "Addons initialized"
        );
        report
    }

    /// Shuts down every registered addon and marks each disabled.
    pub async fn shutdown_all(&self) -> DispatchReport {
        let targets = self.snapshot(false).await;
        let mut report = DispatchReport::default();

        for addon in targets {
            let id = addon.identity().id.clone();
            report.invoked += 1;
            match guarded(addon.shutdown()).await {
                Ok(()) => {
                    self.set_enabled(&id, false).await;
                }
                Err(message) => {
                    error!(addon_id = %id, error = %message, "Addon failed to shut down");
                    report.failed.push((id, message));
                }
            }
        }

        info!(addons = report.invoked, "Addons shut down");
        report
    }

    /// Looks up one addon.
    pub async fn get(&self, id: &str) -> Option<AddonDescriptor> {
        let entries = self.entries.read().await;
        entries.iter().find(|e| e.id() == id).map(AddonEntry::descriptor)
    }

    /// All registered addons in registration order.
    pub async fn list_all(&self) -> Vec<AddonDescriptor> {
        let entries = self.entries.read().await;
        entries.iter().map(AddonEntry::descriptor).collect()
    }

    pub async fn is_enabled(&self, id: &str) -> bool {
        let entries = self.entries.read().await;
        entries.iter().any(|e| e.id() == id && e.enabled)
    }

    pub async fn enabled_ids(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.id().to_string())
            .collect()
    }

    /// Number of registered addons.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn lookup(&self, id: &str) -> AppResult<Arc<dyn Addon>> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|e| e.id() == id)
            .map(|e| e.addon.clone())
            .ok_or_else(|| AppError::not_found(format!("Addon '{id}' not found")))
    }

    async fn snapshot(&self, only_enabled: bool) -> Vec<Arc<dyn Addon>> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| !only_enabled || e.enabled)
            .map(|e| e.addon.clone())
            .collect()
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.id() == id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

/// Awaits an addon future, turning both errors and panics into a message.
async fn guarded<F>(fut: F) -> Result<(), String>
where
    F: Future<Output = AppResult<()>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
