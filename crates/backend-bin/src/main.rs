use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use backend_lib::{
    config::{LogFormat, Settings, DEFAULT_CONFIG_FILE},
    router,
    storage::FlatFileStorage,
    AppState,
};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

/// VisionAssist API server
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`
    #[arg(long)]
    port: Option<u16>,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

fn init_tracing(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    match settings.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    init_tracing(&settings);

    // A missing secret or bad algorithm stops the process here
    settings.validate().context("invalid configuration")?;
    if cli.check_config {
        tracing::info!("configuration OK");
        return Ok(());
    }

    let addr = settings.bind_addr()?;
    let state = Arc::new(AppState::<FlatFileStorage>::new_default(settings)?);

    // Setup a background task for limiter cleanup
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        // Run cleanup every 15 minutes
        let mut interval = interval(Duration::from_secs(15 * 60));
        loop {
            interval.tick().await;
            cleanup_state.rate_limiter.cleanup();
            cleanup_state.auth_rate_limiter.cleanup();
            tracing::debug!("rate limiter cleanup done");
        }
    });

    let app = router::create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
