//! Janseva queue engine HTTP server.
//!
//! Wires the Postgres token store, broadcast notifier, catalog snapshot,
//! and queue engine behind the Axum router, then serves until shutdown.

mod catalog;
mod config;

use anyhow::Context;
use catalog::SnapshotCatalog;
use config::Config;
use janseva_core::environment::SystemClock;
use janseva_engine::{BroadcastNotifier, QueueEngine};
use janseva_postgres::PostgresTokenStore;
use janseva_web::{AppState, build_router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Janseva queue engine server");

    info!(url = %config.postgres.url, "Connecting to token store");
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .connect(&config.postgres.url)
        .await
        .context("connecting to PostgreSQL")?;
    let store = PostgresTokenStore::new(pool);
    store.migrate().await.context("running migrations")?;
    info!("Token store ready");

    let catalog = match &config.queue.catalog_path {
        Some(path) => {
            let catalog = SnapshotCatalog::from_file(path)?;
            info!(path, offices = catalog.office_count(), "Catalog loaded");
            catalog
        }
        None => {
            info!("CATALOG_PATH unset; serving the built-in demo catalog");
            SnapshotCatalog::demo()
        }
    };

    let engine = QueueEngine::new(
        Arc::new(store),
        Arc::new(BroadcastNotifier::new()),
        Arc::new(catalog),
        Arc::new(SystemClock),
        config.engine(),
    );

    let router = build_router(AppState::new(engine));
    let bind = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(%bind, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolve on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => tracing::error!(%error, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("ctrl-c received"),
        () = terminate => info!("SIGTERM received"),
    }
}
