//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `deployment_flipper_passes_total` - Total number of reconciliation passes
//! - `deployment_flipper_pass_errors_total` - Passes aborted because workloads could not be listed
//! - `deployment_flipper_pass_duration_seconds` - Duration of reconciliation passes
//! - `deployment_flipper_workloads_watched` - Watched workloads seen by the last pass, per namespace
//! - `deployment_flipper_workloads_stable` - Stable workloads seen by the last pass, per namespace
//! - `deployment_flipper_drift_detected_total` - Referenced objects found changed after their workload became stable
//! - `deployment_flipper_restarts_total` - Restarts issued
//! - `deployment_flipper_restart_errors_total` - Restarts that failed
//! - `deployment_flipper_fingerprint_errors_total` - Fingerprint fetch failures, by kind
//! - `deployment_flipper_fingerprints_tracked` - Objects held in the fingerprint store

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static PASSES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "deployment_flipper_passes_total",
        "Total number of reconciliation passes",
    )
    .expect("Failed to create PASSES_TOTAL metric - this should never happen")
});

static PASS_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "deployment_flipper_pass_errors_total",
        "Total number of passes aborted because watched workloads could not be listed",
    )
    .expect("Failed to create PASS_ERRORS_TOTAL metric - this should never happen")
});

static PASS_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "deployment_flipper_pass_duration_seconds",
            "Duration of reconciliation passes in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create PASS_DURATION metric - this should never happen")
});

static WORKLOADS_WATCHED: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    IntGaugeVec::new(
        prometheus::Opts::new(
            "deployment_flipper_workloads_watched",
            "Watched workloads seen by the last pass",
        ),
        &["namespace"],
    )
    .expect("Failed to create WORKLOADS_WATCHED metric - this should never happen")
});

static WORKLOADS_STABLE: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    IntGaugeVec::new(
        prometheus::Opts::new(
            "deployment_flipper_workloads_stable",
            "Stable workloads seen by the last pass",
        ),
        &["namespace"],
    )
    .expect("Failed to create WORKLOADS_STABLE metric - this should never happen")
});

static DRIFT_DETECTED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "deployment_flipper_drift_detected_total",
            "Referenced objects found changed after their workload became stable",
        ),
        &["kind"],
    )
    .expect("Failed to create DRIFT_DETECTED_TOTAL metric - this should never happen")
});

static RESTARTS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "deployment_flipper_restarts_total",
        "Total number of restarts issued",
    )
    .expect("Failed to create RESTARTS_TOTAL metric - this should never happen")
});

static RESTART_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "deployment_flipper_restart_errors_total",
        "Total number of restarts that failed",
    )
    .expect("Failed to create RESTART_ERRORS_TOTAL metric - this should never happen")
});

static FINGERPRINT_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "deployment_flipper_fingerprint_errors_total",
            "Total number of fingerprint fetch failures by object kind",
        ),
        &["kind"],
    )
    .expect("Failed to create FINGERPRINT_ERRORS_TOTAL metric - this should never happen")
});

static FINGERPRINTS_TRACKED: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "deployment_flipper_fingerprints_tracked",
        "Configuration objects held in the fingerprint store",
    )
    .expect("Failed to create FINGERPRINTS_TRACKED metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Fails only when a metric is registered twice"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(PASSES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PASS_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PASS_DURATION.clone()))?;
    REGISTRY.register(Box::new(WORKLOADS_WATCHED.clone()))?;
    REGISTRY.register(Box::new(WORKLOADS_STABLE.clone()))?;
    REGISTRY.register(Box::new(DRIFT_DETECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESTARTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESTART_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FINGERPRINT_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FINGERPRINTS_TRACKED.clone()))?;

    Ok(())
}

pub fn increment_passes() {
    PASSES_TOTAL.inc();
}

pub fn increment_pass_errors() {
    PASS_ERRORS_TOTAL.inc();
}

pub fn observe_pass_duration(duration: f64) {
    PASS_DURATION.observe(duration);
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "Workload counts never approach i64::MAX"
)]
pub fn set_workloads(namespace: &str, watched: usize, stable: usize) {
    WORKLOADS_WATCHED
        .with_label_values(&[namespace])
        .set(watched as i64);
    WORKLOADS_STABLE
        .with_label_values(&[namespace])
        .set(stable as i64);
}

pub fn increment_drift_detected(kind: &str) {
    DRIFT_DETECTED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_restarts() {
    RESTARTS_TOTAL.inc();
}

pub fn increment_restart_errors() {
    RESTART_ERRORS_TOTAL.inc();
}

pub fn increment_fingerprint_errors(kind: &str) {
    FINGERPRINT_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "Store size never approaches i64::MAX"
)]
pub fn set_fingerprints_tracked(count: usize) {
    FINGERPRINTS_TRACKED.set(count as i64);
}
