//! # Types
//!
//! Errors and per-pass results produced by the reconciler.

use crate::controller::gateway::GatewayError;
use crate::store::ConfigKind;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// Listing watched workloads failed; the whole pass was abandoned
    #[error("Failed to list watched workloads in namespace {namespace}: {source}")]
    ListWorkloads {
        namespace: String,
        #[source]
        source: GatewayError,
    },
}

/// A referenced configuration object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigRef {
    pub kind: ConfigKind,
    pub name: String,
}

impl ConfigRef {
    #[must_use]
    pub fn new(kind: ConfigKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ConfigRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// What happened to one workload during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadOutcome {
    /// Rollout not settled; nothing was evaluated
    Unstable,
    /// Stable and no referenced object changed since it became stable
    NoDrift,
    /// Drift found and the restart was accepted
    Restarted,
    /// Drift found but the restart call failed; retried next pass
    RestartFailed,
}

impl WorkloadOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadOutcome::Unstable => "unstable",
            WorkloadOutcome::NoDrift => "no-drift",
            WorkloadOutcome::Restarted => "restarted",
            WorkloadOutcome::RestartFailed => "restart-failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadReport {
    pub name: String,
    pub outcome: WorkloadOutcome,
    /// References whose content changed after the workload became stable
    pub drifted: Vec<ConfigRef>,
    /// References whose fingerprint could not be fetched
    pub failed: Vec<ConfigRef>,
}

impl WorkloadReport {
    pub(crate) fn unstable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: WorkloadOutcome::Unstable,
            drifted: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Result of one reconciliation pass over a namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub namespace: String,
    pub workloads: Vec<WorkloadReport>,
}

impl PassSummary {
    /// Number of watched workloads listed
    #[must_use]
    pub fn watched(&self) -> usize {
        self.workloads.len()
    }

    /// Number of workloads whose rollout had settled
    #[must_use]
    pub fn stable(&self) -> usize {
        self.workloads
            .iter()
            .filter(|w| w.outcome != WorkloadOutcome::Unstable)
            .count()
    }

    /// Names of workloads restarted this pass
    #[must_use]
    pub fn restarted(&self) -> Vec<&str> {
        self.with_outcome(WorkloadOutcome::Restarted)
    }

    /// Names of workloads whose restart failed this pass
    #[must_use]
    pub fn restart_failures(&self) -> Vec<&str> {
        self.with_outcome(WorkloadOutcome::RestartFailed)
    }

    /// Total fingerprint fetch failures across all workloads
    #[must_use]
    pub fn fetch_failures(&self) -> usize {
        self.workloads.iter().map(|w| w.failed.len()).sum()
    }

    /// Report for a workload by name
    #[must_use]
    pub fn workload(&self, name: &str) -> Option<&WorkloadReport> {
        self.workloads.iter().find(|w| w.name == name)
    }

    fn with_outcome(&self, outcome: WorkloadOutcome) -> Vec<&str> {
        self.workloads
            .iter()
            .filter(|w| w.outcome == outcome)
            .map(|w| w.name.as_str())
            .collect()
    }
}
