//! Addon package installer.
//!
//! Installs `.zip` packages into the addons root, removes them, updates
//! them with a backup/restore guarantee, and manages the on-disk enabled
//! marker. The installer never talks to the runtime; the host reconciles
//! the marker with [`AddonManager`](crate::manager::AddonManager) at load.

pub mod archive;
pub mod error;

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pagehub_core::config::addon::AddonConfig;

use crate::addon::AddonIdentity;
use crate::descriptor::{DESCRIPTOR_FILE, PackageDescriptor, is_safe_id};

pub use error::InstallError;

/// Marker file whose presence means "enabled".
pub const ENABLED_MARKER: &str = ".addon-enabled";

/// Default upload ceiling (10 MiB).
pub const DEFAULT_MAX_PACKAGE_BYTES: u64 = 10 * 1024 * 1024;

const PACKAGE_EXTENSION: &str = "zip";

/// An addon directory under the addons root.
#[derive(Debug, Clone, Serialize)]
pub struct InstalledAddon {
    #[serde(flatten)]
    pub identity: AddonIdentity,
    pub directory: PathBuf,
    /// Whether the enabled marker is present.
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy)]
enum InstallMode<'a> {
    Fresh,
    Replace {
        expected_id: &'a str,
        existing: &'a Path,
    },
}

/// Places, replaces and removes addon packages on disk.
#[derive(Debug, Clone)]
pub struct AddonInstaller {
    addons_dir: PathBuf,
    scratch_dir: PathBuf,
    max_package_bytes: u64,
}

impl AddonInstaller {
    /// Creates an installer over `addons_dir`, staging uploads in `scratch_dir`.
    pub fn new(addons_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            addons_dir: addons_dir.into(),
            scratch_dir: scratch_dir.into(),
            max_package_bytes: DEFAULT_MAX_PACKAGE_BYTES,
        }
    }

    /// Creates an installer from the `[addons]` configuration section.
    pub fn from_config(config: &AddonConfig) -> Self {
        Self::new(&config.directory, &config.scratch_directory)
            .with_max_package_bytes(config.max_package_bytes)
    }

    /// Overrides the upload ceiling.
    pub fn with_max_package_bytes(mut self, max_package_bytes: u64) -> Self {
        self.max_package_bytes = max_package_bytes;
        self
    }

    /// Installs a new addon from an uploaded package.
    ///
    /// Fails with [`InstallError::AlreadyInstalled`] if the descriptor's id
    /// already has a directory; nothing is overwritten.
    pub async fn install(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<InstalledAddon, InstallError> {
        self.install_package(bytes, filename, InstallMode::Fresh)
            .await
    }

    /// Replaces an installed addon with a new package.
    ///
    /// The current directory is copied to a timestamped backup first. If the
    /// new package fails at any step the partial result is removed and the
    /// backup is put back in place, so the addon's directory is either fully
    /// replaced or left as it was. The enabled marker survives a successful
    /// update.
    pub async fn update(
        &self,
        id: &str,
        bytes: &[u8],
        filename: &str,
    ) -> Result<InstalledAddon, InstallError> {
        let existing = self
            .resolve_dir(id)
            .await
            .ok_or_else(|| InstallError::NotInstalled(id.to_string()))?;
        let was_enabled = marker_present(&existing).await;

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|e| InstallError::io("Failed to create scratch directory", e))?;
        let backup = self.scratch_dir.join(format!(
            "{id}_backup_{}",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        if tokio::fs::try_exists(&backup).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&backup)
                .await
                .map_err(|e| InstallError::io("Failed to clear stale backup", e))?;
        }

        let (from, to) = (existing.clone(), backup.clone());
        let copied = tokio::task::spawn_blocking(move || archive::copy_tree(&from, &to)).await;
        match copied {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                discard_dir(&backup).await;
                return Err(InstallError::io("Failed to back up addon", e));
            }
            Err(e) => {
                discard_dir(&backup).await;
                return Err(e.into());
            }
        }
        info!(addon_id = %id, backup = %backup.display(), "Backed up addon before update");

        let mode = InstallMode::Replace {
            expected_id: id,
            existing: &existing,
        };
        match self.install_package(bytes, filename, mode).await {
            Ok(mut installed) => {
                if was_enabled {
                    match write_marker(&installed.directory).await {
                        Ok(()) => installed.enabled = true,
                        Err(e) => warn!(addon_id = %id, error = %e, "Failed to carry enabled marker"),
                    }
                }
                if let Err(e) = tokio::fs::remove_dir_all(&backup).await {
                    warn!(backup = %backup.display(), error = %e, "Failed to remove backup");
                }
                info!(addon_id = %id, version = %installed.identity.version, "Addon updated");
                Ok(installed)
            }
            Err(err) => {
                warn!(addon_id = %id, error = %err, "Update failed, restoring backup");
                let partial = self.addons_dir.join(id);
                self.restore(&backup, &existing, &partial).await?;
                info!(addon_id = %id, "Addon restored from backup");
                Err(err)
            }
        }
    }

    /// Removes an addon's directory. Returns `false` when nothing was
    /// installed under `id`.
    pub async fn uninstall(&self, id: &str) -> Result<bool, InstallError> {
        if !is_safe_id(id) {
            return Err(InstallError::InvalidInput(format!("invalid addon id '{id}'")));
        }
        let Some(dir) = self.resolve_dir(id).await else {
            return Ok(false);
        };
        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| InstallError::io("Failed to remove addon directory", e))?;
        info!(addon_id = %id, directory = %dir.display(), "Addon uninstalled");
        Ok(true)
    }

    /// Creates the enabled marker.
    pub async fn enable(&self, id: &str) -> Result<(), InstallError> {
        let dir = self.installed_dir(id).await?;
        write_marker(&dir)
            .await
            .map_err(|e| InstallError::io("Failed to write enabled marker", e))?;
        info!(addon_id = %id, "Addon marked enabled");
        Ok(())
    }

    /// Removes the enabled marker.
    pub async fn disable(&self, id: &str) -> Result<(), InstallError> {
        let dir = self.installed_dir(id).await?;
        match tokio::fs::remove_file(dir.join(ENABLED_MARKER)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(InstallError::io("Failed to remove enabled marker", e)),
        }
        info!(addon_id = %id, "Addon marked disabled");
        Ok(())
    }

    /// Returns whether the enabled marker exists for `id`.
    pub async fn is_enabled(&self, id: &str) -> bool {
        match self.resolve_dir(id).await {
            Some(dir) => marker_present(&dir).await,
            None => false,
        }
    }

    /// Every subdirectory of the addons root that holds a readable descriptor.
    pub async fn list_installed(&self) -> Result<Vec<InstalledAddon>, InstallError> {
        let mut installed = Vec::new();
        for dir in self.addon_dirs().await? {
            let Ok(Some(descriptor)) = PackageDescriptor::read_from_dir(&dir).await else {
                continue;
            };
            let identity = descriptor.into_identity(&dir_name(&dir));
            installed.push(InstalledAddon {
                identity,
                enabled: marker_present(&dir).await,
                directory: dir,
            });
        }
        Ok(installed)
    }

    async fn install_package(
        &self,
        bytes: &[u8],
        filename: &str,
        mode: InstallMode<'_>,
    ) -> Result<InstalledAddon, InstallError> {
        self.check_upload(bytes, filename)?;

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|e| InstallError::io("Failed to create scratch directory", e))?;
        let work_dir = self
            .scratch_dir
            .join(format!("install_{}", Uuid::now_v7().simple()));

        let result = self.stage_and_place(bytes, &work_dir, mode).await;
        discard_dir(&work_dir).await;
        result
    }

    async fn stage_and_place(
        &self,
        bytes: &[u8],
        work_dir: &Path,
        mode: InstallMode<'_>,
    ) -> Result<InstalledAddon, InstallError> {
        let archive_path = work_dir.join("package.zip");
        let extract_dir = work_dir.join("extracted");
        tokio::fs::create_dir_all(&extract_dir)
            .await
            .map_err(|e| InstallError::io("Failed to create extraction directory", e))?;
        tokio::fs::write(&archive_path, bytes)
            .await
            .map_err(|e| InstallError::io("Failed to save upload", e))?;

        let package_root = {
            let (zip_path, dest) = (archive_path.clone(), extract_dir.clone());
            tokio::task::spawn_blocking(move || {
                archive::extract(&zip_path, &dest)?;
                Ok::<_, InstallError>(archive::find_descriptor_root(&dest))
            })
            .await??
        }
        .ok_or_else(|| {
            InstallError::DescriptorMissing(format!(
                "no {DESCRIPTOR_FILE} at the package root or within two folder levels"
            ))
        })?;
        debug!(package_root = %package_root.display(), "Located descriptor");

        let identity = PackageDescriptor::read_from_dir(&package_root)
            .await
            .map_err(|e| InstallError::DescriptorInvalid(e.to_string()))?
            .ok_or_else(|| InstallError::DescriptorMissing(DESCRIPTOR_FILE.to_string()))?
            .validate()
            .map_err(InstallError::DescriptorInvalid)?;

        match mode {
            InstallMode::Fresh => {
                if self.resolve_dir(&identity.id).await.is_some() {
                    return Err(InstallError::AlreadyInstalled(identity.id));
                }
            }
            InstallMode::Replace {
                expected_id,
                existing,
            } => {
                if identity.id != expected_id {
                    return Err(InstallError::DescriptorInvalid(format!(
                        "package id '{}' does not match addon '{expected_id}'",
                        identity.id
                    )));
                }
                tokio::fs::remove_dir_all(existing)
                    .await
                    .map_err(|e| InstallError::io("Failed to remove previous version", e))?;
            }
        }

        tokio::fs::create_dir_all(&self.addons_dir)
            .await
            .map_err(|e| InstallError::io("Failed to create addons directory", e))?;
        let target = self.addons_dir.join(&identity.id);
        archive::move_dir(&package_root, &target)
            .await
            .map_err(|e| InstallError::io("Failed to move addon into place", e))?;

        info!(
            addon_id = %identity.id,
            version = %identity.version,
            directory = %target.display(),
            "Addon installed"
        );

        Ok(InstalledAddon {
            enabled: marker_present(&target).await,
            identity,
            directory: target,
        })
    }

    fn check_upload(&self, bytes: &[u8], filename: &str) -> Result<(), InstallError> {
        if bytes.is_empty() {
            return Err(InstallError::InvalidInput("package is empty".to_string()));
        }
        if bytes.len() as u64 > self.max_package_bytes {
            return Err(InstallError::InvalidInput(format!(
                "package is {} bytes, limit is {}",
                bytes.len(),
                self.max_package_bytes
            )));
        }
        let is_zip = Path::new(filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKAGE_EXTENSION));
        if !is_zip {
            return Err(InstallError::InvalidInput(format!(
                "'{filename}' is not a .{PACKAGE_EXTENSION} package"
            )));
        }
        Ok(())
    }

    async fn restore(
        &self,
        backup: &Path,
        original: &Path,
        partial: &Path,
    ) -> Result<(), InstallError> {
        for leftover in [partial, original] {
            if tokio::fs::try_exists(leftover).await.unwrap_or(false) {
                tokio::fs::remove_dir_all(leftover)
                    .await
                    .map_err(|e| InstallError::io("Failed to remove partial update", e))?;
            }
        }
        archive::move_dir(backup, original)
            .await
            .map_err(|e| InstallError::io("Failed to restore backup", e))
    }

    async fn installed_dir(&self, id: &str) -> Result<PathBuf, InstallError> {
        self.resolve_dir(id)
            .await
            .ok_or_else(|| InstallError::NotInstalled(id.to_string()))
    }

    /// Finds the directory for `id`: `<root>/<id>` if present, otherwise the
    /// first subdirectory whose descriptor declares that id.
    async fn resolve_dir(&self, id: &str) -> Option<PathBuf> {
        if !is_safe_id(id) {
            return None;
        }
        let direct = self.addons_dir.join(id);
        if tokio::fs::metadata(&direct)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Some(direct);
        }

        let mut matches = Vec::new();
        for dir in self.addon_dirs().await.ok()? {
            let declared = match PackageDescriptor::read_from_dir(&dir).await {
                Ok(Some(descriptor)) => descriptor.id,
                _ => None,
            };
            if declared.as_deref().map(str::trim) == Some(id) {
                matches.push(dir);
            }
        }
        if matches.len() > 1 {
            warn!(addon_id = %id, count = matches.len(), "Several directories declare the same addon id");
        }
        matches.into_iter().next()
    }

    async fn addon_dirs(&self) -> Result<Vec<PathBuf>, InstallError> {
        let mut reader = match tokio::fs::read_dir(&self.addons_dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(InstallError::io("Failed to read addons directory", e)),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| InstallError::io("Failed to read addons directory", e))?
        {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

/// Removes a scratch directory if present; failures are only logged.
async fn discard_dir(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(directory = %dir.display(), error = %e, "Failed to clean scratch files");
        }
    }
}

async fn marker_present(dir: &Path) -> bool {
    tokio::fs::try_exists(dir.join(ENABLED_MARKER))
        .await
        .unwrap_or(false)
}

async fn write_marker(dir: &Path) -> std::io::Result<()> {
    tokio::fs::write(dir.join(ENABLED_MARKER), "enabled").await
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
