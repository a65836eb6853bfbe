//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use deployment_flipper::prelude::*;
//! ```
//!
//! This brings into scope:
//! - The gateway trait and its Kubernetes implementation
//! - Reconciler types (Reconciler, ReconcilerError, PassSummary, etc.)
//! - The fingerprint store and clock
//! - Config types (ControllerConfig, ServerConfig)

// Gateway - needed for implementing cluster access
pub use crate::controller::gateway::{ClusterGateway, GatewayError, KubeGateway};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{
    ConfigRef, PassSummary, Reconciler, ReconcilerError, WorkloadOutcome, WorkloadReport,
};

// Pure building blocks
pub use crate::controller::references::{extract_references, ReferencedConfigs};
pub use crate::controller::stability::{classify, Stability};
pub use crate::controller::workload::{
    ConditionKind, ConditionStatus, WorkloadCondition, WorkloadSnapshot,
};

// Store
pub use crate::store::{fingerprint_of, Clock, ConfigKind, FingerprintStore, SystemClock};

// Config types - for configuration management
pub use crate::config::{ControllerConfig, ServerConfig};
