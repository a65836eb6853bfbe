//! # Poll Loop
//!
//! Fixed-interval scheduler driving the reconcilers.
//!
//! Every tick runs one pass per namespace, sequentially. A pass that fails to
//! list workloads is logged and simply retried on the next tick; there is no
//! backoff. Ticks missed while a slow pass runs are delayed, never bursted.

use crate::controller::reconciler::{PassSummary, Reconciler};
use crate::controller::server::ServerState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Run every reconciler once, in order
///
/// Returns the summaries of the passes that completed.
pub async fn run_tick(reconcilers: &[Reconciler]) -> Vec<PassSummary> {
    let mut summaries = Vec::with_capacity(reconcilers.len());

    for reconciler in reconcilers {
        match reconciler.reconcile().await {
            Ok(summary) => {
                for name in summary.restarted() {
                    info!(
                        namespace = summary.namespace.as_str(),
                        workload = name,
                        "deployment restarted"
                    );
                }
                for name in summary.restart_failures() {
                    warn!(
                        namespace = summary.namespace.as_str(),
                        workload = name,
                        "deployment restart failed"
                    );
                }
                summaries.push(summary);
            }
            Err(e) => {
                error!(
                    namespace = reconciler.namespace(),
                    error = %e,
                    "reconciliation pass aborted"
                );
            }
        }
    }

    summaries
}

/// Run the poll loop until a shutdown signal arrives
///
/// With `once` set, a single tick runs and the loop returns.
pub async fn run_poll_loop(
    reconcilers: Vec<Reconciler>,
    server_state: Arc<ServerState>,
    interval: Duration,
    once: bool,
) {
    if once {
        info!("Running a single reconciliation tick");
        run_tick(&reconcilers).await;
        return;
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal, stopping poll loop");
                server_state.set_ready(false);
                break;
            }
            _ = ticker.tick() => {
                run_tick(&reconcilers).await;
            }
        }
    }

    info!("Controller stopped gracefully");
}
