//! TradingAce Server
//!
//! Runs the campaign reward engine over PostgreSQL and serves the REST API.
//! Swap events enter through the sharded trade feed; leaderboards and user
//! progress are read through the API.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! tradingace-server
//!
//! # Start with custom config
//! tradingace-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! TRADINGACE__SERVER__PORT=9000 tradingace-server
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tradingace_api::{create_router, AppState};
use tradingace_db::Database;
use tradingace_engine::{CampaignService, TradeFeed};

use crate::config::{LoggingConfig, ServerConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// TradingAce Server - campaign rewards for pool traders
#[derive(Parser, Debug)]
#[command(name = "tradingace-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "TRADINGACE_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "TRADINGACE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TRADINGACE_PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TRADINGACE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "TRADINGACE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Mount the admin routes
    #[arg(long)]
    enable_admin: bool,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    apply_args(&mut server_config, args);

    init_logging(&server_config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting TradingAce server"
    );

    server_config.validate()?;

    let db = init_database(&server_config).await?;
    let store = Arc::new(db.store());

    let service = Arc::new(CampaignService::new(
        store.clone(),
        store.clone(),
        store,
        server_config.rewards.clone(),
    ));

    let rules = service.rules();
    tracing::info!(
        reference_side = ?rules.reference_side,
        token_decimals = rules.token_decimals,
        onboarding_threshold = %rules.onboarding_threshold,
        eligibility = ?rules.eligibility,
        "Reward rules loaded"
    );

    let shutdown = CancellationToken::new();
    let feed = TradeFeed::spawn(service.clone(), server_config.feed.clone(), shutdown.clone());

    let state = Arc::new(AppState::new(service, feed.handle()));
    let app = create_router(state, (&server_config.api).into());

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        host = %server_config.server.host,
        port = server_config.server.port,
        admin = server_config.api.enable_admin,
        "Server listening"
    );

    let server_shutdown = shutdown.clone();
    let grace = server_config.server.shutdown_timeout();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            server_shutdown.cancel();
            tracing::info!(timeout_secs = grace.as_secs(), "Draining in-flight requests");
        })
        .await?;

    // Workers stop at cancellation; give them the same grace period
    shutdown.cancel();
    match tokio::time::timeout(grace.max(Duration::from_secs(1)), feed.close_and_join()).await {
        Ok(stats) => tracing::info!(dropped = stats.dropped, "Trade feed drained"),
        Err(_) => tracing::warn!("Trade feed did not stop in time"),
    }

    db.pg.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

fn apply_args(config: &mut ServerConfig, args: Args) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if args.enable_admin {
        config.api.enable_admin = true;
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }
}

/// Connect, migrate and health-check the database
async fn init_database(config: &ServerConfig) -> anyhow::Result<Database> {
    let db = Database::connect(&config.database).await?;

    if config.database.run_migrations {
        db.migrate().await?;
    }

    let health = db.health_check().await;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(postgres = health.postgres, "Database health check passed");
    Ok(db)
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["tradingace-server", "--port", "9000", "--enable-admin"]);
        assert_eq!(args.port, Some(9000));
        assert!(args.enable_admin);
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = ServerConfig::default();
        let args = Args::parse_from([
            "tradingace-server",
            "--database-url",
            "postgresql://ace@db/tradingace",
            "--log-format",
            "json",
        ]);
        apply_args(&mut config, args);

        assert_eq!(config.database.url, "postgresql://ace@db/tradingace");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert!(!config.api.enable_admin);
    }
}
