//! # Kubernetes Gateway
//!
//! [`ClusterGateway`] backed by the Kubernetes API through `kube::Client`.

use crate::constants::{LAST_APPLIED_CONFIGURATION_ANNOTATION, RESTARTED_AT_ANNOTATION};
use crate::controller::gateway::{ClusterGateway, GatewayError};
use crate::controller::workload::{is_watched, WorkloadSnapshot};
use crate::store::{fingerprint_of, ConfigKind};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fmt::Debug;
use tracing::debug;

/// Field manager recorded on restart patches
const FIELD_MANAGER: &str = "deployment-flipper";

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    watch_annotation: String,
}

impl std::fmt::Debug for KubeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeGateway")
            .field("watch_annotation", &self.watch_annotation)
            .finish_non_exhaustive()
    }
}

impl KubeGateway {
    #[must_use]
    pub fn new(client: Client, watch_annotation: impl Into<String>) -> Self {
        Self {
            client,
            watch_annotation: watch_annotation.into(),
        }
    }

    async fn last_applied_fingerprint<K>(
        &self,
        kind: ConfigKind,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let object = api.get(name).await?;

        let applied = object
            .annotations()
            .get(LAST_APPLIED_CONFIGURATION_ANNOTATION)
            .ok_or_else(|| GatewayError::MissingAnnotation {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        Ok(fingerprint_of(applied))
    }
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    async fn list_watched_workloads(
        &self,
        namespace: &str,
    ) -> Result<Vec<WorkloadSnapshot>, GatewayError> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let list = deployments.list(&ListParams::default()).await?;
        let total = list.items.len();

        let watched: Vec<WorkloadSnapshot> = list
            .items
            .iter()
            .filter(|deployment| is_watched(deployment, &self.watch_annotation))
            .map(WorkloadSnapshot::from)
            .collect();

        debug!(
            namespace = namespace,
            total = total,
            watched = watched.len(),
            "listed deployments"
        );
        Ok(watched)
    }

    async fn get_config_map_fingerprint(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError> {
        self.last_applied_fingerprint::<ConfigMap>(ConfigKind::ConfigMap, name, namespace)
            .await
    }

    async fn get_secret_fingerprint(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError> {
        self.last_applied_fingerprint::<Secret>(ConfigKind::Secret, name, namespace)
            .await
    }

    async fn restart_workload(&self, name: &str, namespace: &str) -> Result<(), GatewayError> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let patch = restart_patch(&chrono::Utc::now().to_rfc3339());

        deployments
            .patch(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Strategic(patch),
            )
            .await?;

        debug!(namespace = namespace, workload = name, "restart patch applied");
        Ok(())
    }
}

/// Strategic merge patch equivalent to `kubectl rollout restart`
fn restart_patch(restarted_at: &str) -> serde_json::Value {
    json!({
        "spec": {
            "template": {
                "metadata": {
                    "annotations": {
                        RESTARTED_AT_ANNOTATION: restarted_at
                    }
                }
            }
        }
    })
}
