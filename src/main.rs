//! PageHub Server
//!
//! Host process for the addon runtime: wires configuration, logging, the
//! database and the addon framework together, then runs until Ctrl-C.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use pagehub_addon::builtin::{ActivityLogAddon, WatermarkAddon};
use pagehub_addon::installer::AddonInstaller;
use pagehub_addon::{AddonManager, HookEvent, HookKind};
use pagehub_core::config::AppConfig;
use pagehub_core::error::AppError;
use pagehub_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("PAGEHUB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PageHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    pagehub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Addon runtime ────────────────────────────────────
    let addons = Arc::new(AddonManager::new(&config.addons.directory));
    addons.register(Arc::new(ActivityLogAddon::new())).await;
    addons.register(Arc::new(WatermarkAddon::new())).await;

    if config.addons.auto_load {
        addons.load().await?;
    }

    // ── Step 3: Decide which addons start enabled ────────────────
    for id in &config.addons.builtin_enabled {
        if let Err(e) = addons.mark_enabled(id).await {
            tracing::warn!(addon_id = %id, error = %e, "Configured built-in addon is not registered");
        }
    }
    if config.addons.reconcile_enabled_markers {
        let installer = AddonInstaller::from_config(&config.addons);
        reconcile_enabled_markers(&addons, &installer).await;
    }

    let report = addons.initialize_all().await;
    for (addon_id, message) in &report.failed {
        tracing::warn!(addon_id = %addon_id, error = %message, "Addon left disabled");
    }

    let mut event = HookEvent::new(HookKind::SystemInitialize)
        .with_string("version", env!("CARGO_PKG_VERSION"));
    addons.dispatch(&mut event).await;

    tracing::info!(
        enabled = ?addons.enabled_ids().await,
        "PageHub is up; press Ctrl-C to stop"
    );

    // ── Step 4: Wait for shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    addons.shutdown_all().await;
    db.close().await;
    tracing::info!("PageHub stopped");
    Ok(())
}

/// Marks every registered addon whose directory has the enabled marker.
async fn reconcile_enabled_markers(addons: &AddonManager, installer: &AddonInstaller) {
    for descriptor in addons.list_all().await {
        let id = descriptor.id();
        if !installer.is_enabled(id).await {
            continue;
        }
        if let Err(e) = addons.mark_enabled(id).await {
            tracing::warn!(addon_id = %id, error = %e, "Failed to apply enabled marker");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
    }
}
