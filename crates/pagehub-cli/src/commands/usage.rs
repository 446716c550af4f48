//! Asset usage index commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use pagehub_core::error::AppError;
use pagehub_entity::content::ContentKind;
use pagehub_service::usage::{AssetUsageService, PgUsageStore, ReferenceScanner};

/// Arguments for usage commands
#[derive(Debug, Args)]
pub struct UsageArgs {
    /// Usage subcommand
    #[command(subcommand)]
    pub command: UsageCommand,
}

/// Usage subcommands
#[derive(Debug, Subcommand)]
pub enum UsageCommand {
    /// Reindex a single page or article
    Reindex {
        /// Content type (page, article)
        #[arg(long)]
        content_type: ContentKind,
        /// Content ID
        #[arg(long)]
        id: i64,
    },
    /// Clear and rebuild the whole index
    Rebuild,
    /// Show where assets are used
    Show {
        /// Asset IDs
        #[arg(required = true)]
        asset_ids: Vec<Uuid>,
    },
}

/// Usage display row
#[derive(Debug, Serialize, Tabled)]
struct UsageRow {
    /// Asset ID
    asset_id: String,
    /// Used by
    used_by: String,
    /// Content ID
    content_id: i64,
    /// Reference kind
    reference: String,
    /// Last seen
    last_seen: String,
}

/// Execute usage commands
pub async fn execute(
    args: &UsageArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::create_db_pool(&config).await?;
    let service = AssetUsageService::new(
        Arc::new(PgUsageStore::new(db.pool().clone())),
        ReferenceScanner::from_config(&config.media)?,
    );

    match &args.command {
        UsageCommand::Reindex { content_type, id } => {
            let written = service.reindex(*content_type, *id).await?;
            output::print_success(&format!(
                "Indexed {content_type} {id}: {written} asset reference(s)"
            ));
        }
        UsageCommand::Rebuild => {
            println!("Rebuilding asset usage index...");
            let summary = service.rebuild_all().await?;
            output::print_success(&format!(
                "Indexed {} content item(s), {} usage record(s)",
                summary.contents_indexed, summary.usages_written
            ));
        }
        UsageCommand::Show { asset_ids } => {
            let grouped = service.usages_for_assets(asset_ids).await?;
            let mut rows = Vec::new();
            for asset_id in asset_ids {
                let usages = grouped.get(asset_id).map(Vec::as_slice).unwrap_or_default();
                if usages.is_empty() && format == OutputFormat::Table {
                    output::print_warning(&format!("{asset_id} is not used anywhere"));
                }
                rows.extend(usages.iter().map(|u| UsageRow {
                    asset_id: u.asset_id.to_string(),
                    used_by: u.label(),
                    content_id: u.content_id,
                    reference: u.reference_kind.clone(),
                    last_seen: u.last_seen_at.format("%Y-%m-%d %H:%M").to_string(),
                }));
            }
            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}
