//! cloudprom exporter
//!
//! - Loads `cloudprom.yaml` (or the path given as first argument)
//! - Builds the handler registry and one collector per enabled product
//! - Polls each namespace on its own interval
//! - Serves `/metrics`, `/healthz`, `/readyz`

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use cloudprom_core::error::{CloudPromError, Result};
use cloudprom_exporter::handler::HandlerRegistry;
use cloudprom_exporter::repository::ReplaySource;
use cloudprom_exporter::{app_state, collector, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(kind = e.kind().as_str(), err = %e, "cloudprom-exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cloudprom.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.exporter.listen.parse().map_err(|_| {
        CloudPromError::Configuration("exporter.listen must be a valid SocketAddr".into())
    })?;

    let registry = HandlerRegistry::builtin()?;
    tracing::info!(namespaces = ?registry.namespaces(), "handlers registered");

    let source = Arc::new(ReplaySource::load_from_file(&cfg.catalog.replay_file)?);
    let state = app_state::AppState::new(cfg, &registry, source.clone(), source).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pollers = collector::spawn_pollers(&state, shutdown_rx);
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "cloudprom-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| CloudPromError::Internal(format!("bind {listen} failed: {e}")))?;

    let draining = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
            draining.set_draining();
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| CloudPromError::Internal(format!("server failed: {e}")))?;

    for p in pollers {
        let _ = p.await;
    }
    Ok(())
}
