//! Addon package management commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use pagehub_addon::installer::{AddonInstaller, InstalledAddon};
use pagehub_core::error::AppError;

/// Arguments for addon commands
#[derive(Debug, Args)]
pub struct AddonArgs {
    /// Addon subcommand
    #[command(subcommand)]
    pub command: AddonCommand,
}

/// Addon subcommands
#[derive(Debug, Subcommand)]
pub enum AddonCommand {
    /// List installed addons
    List,
    /// Install an addon from a .zip package
    Install {
        /// Path to the package
        package: PathBuf,
    },
    /// Replace an installed addon with a new package
    Update {
        /// Addon ID
        id: String,
        /// Path to the package
        package: PathBuf,
    },
    /// Remove an installed addon
    Uninstall {
        /// Addon ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Create the enabled marker for an addon
    Enable {
        /// Addon ID
        id: String,
    },
    /// Remove the enabled marker for an addon
    Disable {
        /// Addon ID
        id: String,
    },
}

/// Addon display row
#[derive(Debug, Serialize, Tabled)]
struct AddonRow {
    /// Addon ID
    id: String,
    /// Name
    name: String,
    /// Version
    version: String,
    /// Author
    author: String,
    /// Enabled marker
    enabled: String,
    /// Directory
    directory: String,
}

impl From<&InstalledAddon> for AddonRow {
    fn from(addon: &InstalledAddon) -> Self {
        Self {
            id: addon.identity.id.clone(),
            name: addon.identity.name.clone(),
            version: addon.identity.version.clone(),
            author: addon.identity.author.clone(),
            enabled: if addon.enabled { "✓" } else { "" }.to_string(),
            directory: addon.directory.display().to_string(),
        }
    }
}

/// Execute addon commands
pub async fn execute(
    args: &AddonArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let installer = AddonInstaller::from_config(&config.addons);

    match &args.command {
        AddonCommand::List => {
            let installed = installer.list_installed().await?;
            let rows: Vec<AddonRow> = installed.iter().map(AddonRow::from).collect();
            output::print_list(&rows, format);
        }
        AddonCommand::Install { package } => {
            let (bytes, filename) = read_package(package).await?;
            let installed = installer.install(&bytes, &filename).await?;
            output::print_success(&format!(
                "Installed {} {} into {}",
                installed.identity.id,
                installed.identity.version,
                installed.directory.display()
            ));
        }
        AddonCommand::Update { id, package } => {
            let (bytes, filename) = read_package(package).await?;
            let updated = installer.update(id, &bytes, &filename).await?;
            output::print_success(&format!(
                "Updated {} to {}",
                updated.identity.id, updated.identity.version
            ));
        }
        AddonCommand::Uninstall { id, yes } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Remove addon '{id}' and all its files?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            if installer.uninstall(id).await? {
                output::print_success(&format!("Uninstalled {id}"));
            } else {
                output::print_warning(&format!("Addon '{id}' is not installed"));
            }
        }
        AddonCommand::Enable { id } => {
            installer.enable(id).await?;
            output::print_success(&format!("Enabled {id}; takes effect on next server start"));
        }
        AddonCommand::Disable { id } => {
            installer.disable(id).await?;
            output::print_success(&format!("Disabled {id}; takes effect on next server start"));
        }
    }

    Ok(())
}

async fn read_package(path: &Path) -> Result<(Vec<u8>, String), AppError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::with_source(
            pagehub_core::error::ErrorKind::Storage,
            format!("Failed to read {}", path.display()),
            e,
        )
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((bytes, filename))
}
