//! spectral-server - Speech analysis web service
//!
//! Serves the Spectral HTTP API and forwards signal processing to the
//! analysis kernel.

use anyhow::{Context, Result};
use clap::Parser;
use spectral_common::config::{default_config_path, Config, TomlConfig};
use spectral_common::db::{auth_sessions, init_database};
use spectral_common::kernel::KernelClient;
use spectral_server::cli::Args;
use spectral_server::{build_router, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Resolved before tracing starts since the log level is part of it
    let config_path = args.config.clone().or_else(default_config_path);
    let toml = match &config_path {
        Some(path) => TomlConfig::load(path)?,
        None => None,
    };
    let config_found = toml.is_some();
    let config = Config::resolve(args.overrides(), toml.unwrap_or_default())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting Spectral server v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if config_found => info!("Loaded config file: {}", path.display()),
        Some(path) => warn!("Config file not found: {} (using defaults)", path.display()),
        None => {}
    }
    info!("Database path: {}", config.database_path.display());
    info!("Kernel origin: {}", config.kernel_origin);

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    let purged = auth_sessions::purge_expired(&pool).await?;
    if purged > 0 {
        info!("Removed {} expired login sessions", purged);
    }

    let kernel = KernelClient::new(&config.kernel_origin)?;

    if config.admin_enabled {
        info!("Admin routes enabled");
    }

    let bind_address = config.bind_address;
    let app = build_router(AppState::new(pool, kernel, config));

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("spectral-server listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
