//! Berthline reservation server.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env` if present)
//! - Installs the Prometheus recorder and serves `/metrics` on its own port
//! - Opens the configured berth store, running migrations for `PostgreSQL`
//! - Seeds the berth catalog on first start
//! - Serves the HTTP API until SIGINT/SIGTERM, then drains in-flight requests
//!
//! # Usage
//!
//! ```bash
//! # In-memory store
//! cargo run --bin berthline
//!
//! # PostgreSQL store
//! STORE_BACKEND=postgres DATABASE_URL=postgres://localhost/berthline cargo run --bin berthline
//! ```

mod config;

use anyhow::Context;
use axum::{Router, routing::get};
use berthline_core::BerthStore;
use berthline_postgres::PostgresBerthStore;
use berthline_runtime::metrics::MetricsServer;
use berthline_runtime::{InMemoryBerthStore, ReservationEngine};
use berthline_web::{AppState, build_router};
use config::{Config, StoreBackend, StoreConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,berthline=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Berthline server");

    let config = Config::from_env()?;
    info!(
        backend = ?config.store.backend,
        port = config.server.port,
        metrics_port = config.server.metrics_port,
        max_retries = config.retry.max_retries,
        "Configuration loaded"
    );

    let mut metrics = MetricsServer::new(config.server.metrics_addr()?);
    metrics.start().context("installing metrics recorder")?;

    let store = open_store(&config.store).await?;
    let engine = ReservationEngine::new(store).with_retry_policy(config.retry.policy());

    engine
        .initialize()
        .await
        .context("seeding berth catalog")?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let metrics_task = serve_metrics(&metrics, shutdown_tx.subscribe()).await?;

    let app = build_router(AppState::new(engine));
    let addr = config.server.http_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding HTTP listener on {addr}"))?;
    info!(address = %addr, "HTTP server listening");

    let mut http_shutdown_rx = shutdown_tx.subscribe();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = http_shutdown_rx.recv().await;
            })
            .await
    });

    tokio::select! {
        () = shutdown_signal() => {}
        result = &mut server => {
            let _ = shutdown_tx.send(());
            return result
                .context("HTTP server task panicked")?
                .context("HTTP server failed");
        }
    }

    info!("Shutting down gracefully...");
    let _ = shutdown_tx.send(());

    let timeout = config.server.shutdown_timeout();
    match tokio::time::timeout(timeout, server).await {
        Ok(Ok(Ok(()))) => info!("HTTP server stopped"),
        Ok(Ok(Err(e))) => error!(error = %e, "HTTP server failed during shutdown"),
        Ok(Err(e)) => error!(error = %e, "HTTP server task failed"),
        Err(_) => warn!(
            timeout_secs = timeout.as_secs(),
            "Shutdown timed out; dropping in-flight requests"
        ),
    }

    if let Some(task) = metrics_task {
        if tokio::time::timeout(timeout, task).await.is_err() {
            warn!("Metrics server shutdown timed out");
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Serve `/metrics` on the metrics address until `shutdown_rx` fires.
///
/// Returns `None` when this process does not own the recorder.
async fn serve_metrics(
    metrics: &MetricsServer,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<Option<JoinHandle<()>>> {
    let Some(handle) = metrics.handle().cloned() else {
        warn!("Metrics recorder owned elsewhere; /metrics endpoint not started");
        return Ok(None);
    };

    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );
    let listener = TcpListener::bind(metrics.addr())
        .await
        .with_context(|| format!("binding metrics listener on {}", metrics.addr()))?;
    info!(address = %metrics.addr(), "Metrics endpoint listening");

    Ok(Some(tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await;
        if let Err(e) = result {
            error!(error = %e, "Metrics server failed");
        }
    })))
}

/// Open the configured store.
async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn BerthStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory berth store; state is lost on restart");
            Ok(Arc::new(InMemoryBerthStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PostgresBerthStore::connect(&config.database_url, &config.pool_settings())
                .await
                .context("connecting to PostgreSQL")?;
            store.migrate().await.context("running migrations")?;
            info!("Using PostgreSQL berth store");
            Ok(Arc::new(store))
        }
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}
