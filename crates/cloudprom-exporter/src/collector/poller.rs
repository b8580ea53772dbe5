//! One interval task per namespace. Unrelated namespaces never wait on each other.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::Instrument;

use crate::app_state::AppState;

use super::ProductCollector;

pub fn spawn_pollers(state: &AppState, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
    state
        .collectors()
        .iter()
        .map(|pc| {
            let span = tracing::info_span!("poller", namespace = %pc.namespace());
            tokio::spawn(poll_loop(state.clone(), Arc::clone(pc), shutdown.clone()).instrument(span))
        })
        .collect()
}

async fn poll_loop(state: AppState, pc: Arc<ProductCollector>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(state.cfg().exporter.scrape_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }
        run_cycle(&state, &pc).await;
    }
    tracing::info!(namespace=%pc.namespace(), "poller stopped");
}

/// Reload series, then collect. A failed reload keeps the previous series set.
pub async fn run_cycle(state: &AppState, pc: &ProductCollector) {
    match pc.reload(state.catalog().as_ref()).await {
        Ok(n) => tracing::debug!(namespace=%pc.namespace(), instances=n, "series reloaded"),
        Err(e) => {
            tracing::warn!(namespace=%pc.namespace(), err=%e, "instance reload failed; keeping previous series")
        }
    }
    pc.collect(
        state.repository().as_ref(),
        state.collect_settings(),
        state.cache(),
        state.metrics(),
    )
    .await;
}
