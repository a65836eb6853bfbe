//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Annotation a Deployment must carry (with a truthy value) to be watched
pub const DEFAULT_WATCH_ANNOTATION: &str = "deployment-flipper.watch";

/// Annotation written by `kubectl apply` holding the last applied manifest
pub const LAST_APPLIED_CONFIGURATION_ANNOTATION: &str =
    "kubectl.kubernetes.io/last-applied-configuration";

/// Pod template annotation used by `kubectl rollout restart`
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// Deployment condition type reported once the minimum replicas are available
pub const CONDITION_AVAILABLE: &str = "Available";

/// Deployment condition type reported while a rollout progresses
pub const CONDITION_PROGRESSING: &str = "Progressing";

/// Progressing reason once the newest ReplicaSet is fully available
pub const NEW_REPLICA_SET_AVAILABLE_REASON: &str = "NewReplicaSetAvailable";

/// Namespace reconciled when none is configured
pub const DEFAULT_WATCH_NAMESPACE: &str = "default";

/// Default interval between reconciliation passes (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;
