//! # Reconciliation Pass
//!
//! One pass over one namespace:
//!
//! 1. List watched workloads (failure aborts the pass, nothing else happens)
//! 2. Skip workloads whose rollout has not settled
//! 3. Collect the ConfigMaps and Secrets each stable workload references
//! 4. Fetch every reference's fingerprint and record it in the store
//! 5. Restart the workload if any reference changed after it became stable
//!
//! Fetch failures are logged and counted but never treated as a change: a
//! missed restart is preferred over one issued from partial data. A failed
//! restart is not retried within the pass; the next pass sees the same drift
//! and tries again.

use crate::controller::gateway::ClusterGateway;
use crate::controller::reconciler::types::{
    ConfigRef, PassSummary, ReconcilerError, WorkloadOutcome, WorkloadReport,
};
use crate::controller::references::{extract_references, ReferencedConfigs};
use crate::controller::stability::{classify, Stability};
use crate::controller::workload::WorkloadSnapshot;
use crate::observability::metrics;
use crate::store::{ConfigKind, FingerprintStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, Instrument};

/// Drift-detection engine for a single namespace
///
/// Holds no state between passes other than the shared fingerprint store.
#[derive(Clone)]
pub struct Reconciler {
    gateway: Arc<dyn ClusterGateway>,
    store: Arc<FingerprintStore>,
    namespace: String,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("namespace", &self.namespace)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct DriftReport {
    drifted: Vec<ConfigRef>,
    failed: Vec<ConfigRef>,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ClusterGateway>,
        store: Arc<FingerprintStore>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            store,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Run one complete pass over the namespace
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError::ListWorkloads`] when the watched workloads
    /// cannot be listed. Per-object failures never fail the pass.
    pub async fn reconcile(&self) -> Result<PassSummary, ReconcilerError> {
        let span = tracing::info_span!("reconcile.pass", namespace = self.namespace.as_str());
        self.run_pass().instrument(span).await
    }

    async fn run_pass(&self) -> Result<PassSummary, ReconcilerError> {
        let start = Instant::now();
        metrics::increment_passes();

        let workloads = match self.gateway.list_watched_workloads(&self.namespace).await {
            Ok(workloads) => workloads,
            Err(source) => {
                metrics::increment_pass_errors();
                return Err(ReconcilerError::ListWorkloads {
                    namespace: self.namespace.clone(),
                    source,
                });
            }
        };

        let mut summary = PassSummary {
            namespace: self.namespace.clone(),
            workloads: Vec::with_capacity(workloads.len()),
        };

        for workload in &workloads {
            let span = tracing::info_span!(
                "reconcile.workload",
                namespace = workload.namespace.as_str(),
                workload = workload.name.as_str()
            );
            let report = self.reconcile_workload(workload).instrument(span).await;
            summary.workloads.push(report);
        }

        metrics::set_workloads(&self.namespace, summary.watched(), summary.stable());
        metrics::set_fingerprints_tracked(self.store.len());
        metrics::observe_pass_duration(start.elapsed().as_secs_f64());

        debug!(
            watched = summary.watched(),
            stable = summary.stable(),
            restarted = summary.restarted().len(),
            fetch_failures = summary.fetch_failures(),
            "pass complete"
        );
        Ok(summary)
    }

    async fn reconcile_workload(&self, workload: &WorkloadSnapshot) -> WorkloadReport {
        let Stability::Stable { since } = classify(&workload.conditions) else {
            debug!("rollout not settled, skipping");
            return WorkloadReport::unstable(&workload.name);
        };
        info!(stable_since = %since, "found stable watched workload");

        let references = extract_references(&workload.containers);
        if references.is_empty() {
            debug!("no referenced ConfigMaps or Secrets");
        }

        let drift = self.evaluate_drift(&references, since).await;

        let outcome = if drift.drifted.is_empty() {
            WorkloadOutcome::NoDrift
        } else {
            self.restart(&workload.name).await
        };

        WorkloadReport {
            name: workload.name.clone(),
            outcome,
            drifted: drift.drifted,
            failed: drift.failed,
        }
    }

    /// Observe every reference and collect those changed after `since`
    ///
    /// All references are evaluated even once drift is found so the store
    /// stays current for every object.
    async fn evaluate_drift(
        &self,
        references: &ReferencedConfigs,
        since: DateTime<Utc>,
    ) -> DriftReport {
        let mut report = DriftReport::default();

        for kind in [ConfigKind::ConfigMap, ConfigKind::Secret] {
            for name in references.names(kind) {
                let reference = ConfigRef::new(kind, name.as_str());

                let fingerprint = match self
                    .gateway
                    .get_fingerprint(kind, name, &self.namespace)
                    .await
                {
                    Ok(fingerprint) => fingerprint,
                    Err(e) => {
                        error!(
                            kind = kind.as_str(),
                            name = name.as_str(),
                            error = %e,
                            "failed to fetch configuration fingerprint"
                        );
                        metrics::increment_fingerprint_errors(kind.as_str());
                        report.failed.push(reference);
                        continue;
                    }
                };

                let changed_at = self.store.observe(&self.namespace, kind, name, &fingerprint);
                if changed_at > since {
                    info!(
                        kind = kind.as_str(),
                        name = name.as_str(),
                        changed_at = %changed_at,
                        "found configuration changed after workload became stable"
                    );
                    metrics::increment_drift_detected(kind.as_str());
                    report.drifted.push(reference);
                } else {
                    debug!(
                        kind = kind.as_str(),
                        name = name.as_str(),
                        changed_at = %changed_at,
                        "configuration unchanged since workload became stable"
                    );
                }
            }
        }

        report
    }

    async fn restart(&self, name: &str) -> WorkloadOutcome {
        match self.gateway.restart_workload(name, &self.namespace).await {
            Ok(()) => {
                info!("workload restarted");
                metrics::increment_restarts();
                WorkloadOutcome::Restarted
            }
            Err(e) => {
                error!(error = %e, "failed to restart workload, will retry next pass");
                metrics::increment_restart_errors();
                WorkloadOutcome::RestartFailed
            }
        }
    }
}
