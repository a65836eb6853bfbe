//! # Reconciler
//!
//! Correlates workload stability with configuration fingerprints and restarts
//! workloads whose configuration changed after they became stable.
//!
//! - `pass`: the per-namespace reconciliation pass
//! - `types`: errors and pass summaries

pub mod pass;
pub mod types;

pub use pass::Reconciler;
pub use types::{ConfigRef, PassSummary, ReconcilerError, WorkloadOutcome, WorkloadReport};
