mod config;
mod http;
mod ingest;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use engine::{Broadcaster, Store};
use tracing::info;

use config::{Cli, Config};
use http::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Phase 1: basic tracing so config loading is observable.
    let _basic_tracing = init_tracing_basic();

    let cli = Cli::parse();
    let config = Config::from_cli(cli).context("failed to resolve configuration")?;

    // Phase 2: replace with the global subscriber.
    drop(_basic_tracing);
    init_tracing_from_config();

    info!(port = config.port, db_path = %config.db_path.display(), "starting peek");

    let process_start = Utc::now();
    let store = Arc::new(
        Store::open(&config.db_path, config.retention)
            .await
            .context("failed to open store")?,
    );
    let broadcaster = Broadcaster::new();

    let ingest_task = tokio::spawn(ingest::run(store.clone(), broadcaster.clone(), config.format));

    let state = AppState::new(store.clone(), broadcaster.clone(), &config, process_start);
    let app = http::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(http::shutdown_signal())
        .await
        .context("server error")?;

    ingest_task.abort();
    broadcaster.shutdown();
    store.close().await.context("failed to close store")?;
    info!("shut down gracefully");
    Ok(())
}

fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_target(true).finish();
    tracing::subscriber::set_default(subscriber)
}

fn init_tracing_from_config() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer().with_target(true);
    tracing_subscriber::registry().with(filter).with(layer).init();
}
