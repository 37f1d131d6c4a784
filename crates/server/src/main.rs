//! sheetkv server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use sheetkv_core::config::AppConfig;
use sheetkv_server::handlers::run_flush;
use sheetkv_server::{AppState, create_router};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// sheetkv - a key-value service over row-oriented tables
#[derive(Parser, Debug)]
#[command(name = "sheetkvd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "SHEETKV_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

/// Load configuration from an optional TOML file overlaid with `SHEETKV_`
/// environment variables.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();
    if Path::new(path).exists() {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::info!(config_path = %path, "No config file found, using defaults and environment");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("SHEETKV_").ignore(&["CONFIG"]).split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    Ok(config)
}

/// Rebuild the index every `interval`, logging failures.
fn spawn_periodic_flush(state: AppState, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = run_flush(&state).await {
                tracing::error!(error = %e, "Periodic flush failed");
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("sheetkv v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    sheetkv_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let store = sheetkv_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    store
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = store.backend_name(), "Storage backend initialized");

    let state = AppState::new(config.clone(), store);

    // A failed startup flush leaves the index empty; the server still starts
    // and POST /v1/flush can retry.
    if config.sync.flush_on_startup {
        match run_flush(&state).await {
            Ok(report) => tracing::info!(
                collections = report.collections,
                total_keys = report.total_keys,
                "Startup flush complete"
            ),
            Err(e) => tracing::error!(error = %e, "Startup flush failed, serving with an empty index"),
        }
    }

    if let Some(interval) = config.sync.interval() {
        spawn_periodic_flush(state.clone(), interval);
        tracing::info!(interval_secs = interval.as_secs(), "Periodic flush enabled");
    }

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
