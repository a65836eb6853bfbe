//! # Cluster Gateway
//!
//! Everything the reconciler needs from the cluster, behind one trait.
//!
//! The reconciler never talks to the API server directly. It reads watched
//! workloads, asks for the fingerprint of each referenced ConfigMap or Secret,
//! and requests restarts, all through [`ClusterGateway`]. Tests substitute an
//! in-memory implementation.

use crate::controller::workload::WorkloadSnapshot;
use crate::store::ConfigKind;
use async_trait::async_trait;
use thiserror::Error;

pub mod kubernetes;

pub use kubernetes::KubeGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The object exists but was never applied with `kubectl apply`
    #[error("{kind} {namespace}/{name} has no last-applied-configuration annotation")]
    MissingAnnotation {
        kind: ConfigKind,
        namespace: String,
        name: String,
    },
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

/// Cluster access used by the reconciler
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// List Deployments in `namespace` that carry the watch annotation
    async fn list_watched_workloads(
        &self,
        namespace: &str,
    ) -> Result<Vec<WorkloadSnapshot>, GatewayError>;

    /// Fingerprint of a ConfigMap's last applied configuration
    async fn get_config_map_fingerprint(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError>;

    /// Fingerprint of a Secret's last applied configuration
    async fn get_secret_fingerprint(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError>;

    /// Stamp the pod template so the Deployment controller rolls every pod
    async fn restart_workload(&self, name: &str, namespace: &str) -> Result<(), GatewayError>;

    /// Fingerprint of either configuration kind
    async fn get_fingerprint(
        &self,
        kind: ConfigKind,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError> {
        match kind {
            ConfigKind::ConfigMap => self.get_config_map_fingerprint(name, namespace).await,
            ConfigKind::Secret => self.get_secret_fingerprint(name, namespace).await,
        }
    }
}
