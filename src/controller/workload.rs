//! # Workload Snapshot
//!
//! Read-only view of a watched Deployment, fetched fresh every pass.
//!
//! Deployment conditions arrive from the API as loosely typed strings. They are
//! converted once, here, into [`WorkloadCondition`] so classification can
//! match on enums instead of comparing strings.

use crate::constants::{CONDITION_AVAILABLE, CONDITION_PROGRESSING};
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentCondition};
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;

/// Deployment condition type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    Available,
    Progressing,
    Other(String),
}

impl From<&str> for ConditionKind {
    fn from(value: &str) -> Self {
        match value {
            CONDITION_AVAILABLE => ConditionKind::Available,
            CONDITION_PROGRESSING => ConditionKind::Progressing,
            other => ConditionKind::Other(other.to_string()),
        }
    }
}

/// Condition status (True, False, Unknown)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl From<&str> for ConditionStatus {
    fn from(value: &str) -> Self {
        match value {
            "True" => ConditionStatus::True,
            "False" => ConditionStatus::False,
            _ => ConditionStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadCondition {
    pub kind: ConditionKind,
    pub status: ConditionStatus,
    pub reason: Option<String>,
    pub last_update_time: Option<DateTime<Utc>>,
}

impl From<&DeploymentCondition> for WorkloadCondition {
    fn from(condition: &DeploymentCondition) -> Self {
        Self {
            kind: ConditionKind::from(condition.type_.as_str()),
            status: ConditionStatus::from(condition.status.as_str()),
            reason: condition.reason.clone(),
            last_update_time: condition.last_update_time.as_ref().and_then(time_to_utc),
        }
    }
}

/// A watched Deployment as seen at the start of a pass
#[derive(Debug, Clone, Default)]
pub struct WorkloadSnapshot {
    pub namespace: String,
    pub name: String,
    /// Conditions in the order the API server reported them
    pub conditions: Vec<WorkloadCondition>,
    /// Init containers followed by regular containers of the pod template
    pub containers: Vec<Container>,
}

impl From<&Deployment> for WorkloadSnapshot {
    fn from(deployment: &Deployment) -> Self {
        let conditions = deployment
            .status
            .as_ref()
            .and_then(|status| status.conditions.as_ref())
            .map(|conditions| conditions.iter().map(WorkloadCondition::from).collect())
            .unwrap_or_default();

        let containers = deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod| {
                pod.init_containers
                    .iter()
                    .flatten()
                    .chain(pod.containers.iter())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            namespace: deployment.namespace().unwrap_or_default(),
            name: deployment.name_any(),
            conditions,
            containers,
        }
    }
}

/// Whether the Deployment opts in through a truthy watch annotation
///
/// Accepts `true`, `1`, `yes` and `on` in any case. Any other value, including
/// `false`, leaves the Deployment unwatched.
#[must_use]
pub fn is_watched(deployment: &Deployment, annotation: &str) -> bool {
    deployment
        .annotations()
        .get(annotation)
        .is_some_and(|value| is_truthy(value))
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

// Go through the RFC 3339 wire form so this does not depend on which datetime
// library k8s-openapi wraps.
fn time_to_utc(time: &Time) -> Option<DateTime<Utc>> {
    serde_json::to_value(time)
        .ok()?
        .as_str()?
        .parse::<DateTime<Utc>>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn deployment(value: serde_json::Value) -> Deployment {
        serde_json::from_value(value).expect("valid Deployment manifest")
    }

    #[test]
    fn test_snapshot_from_deployment() {
        let deploy = deployment(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": "web",
                "namespace": "default",
                "annotations": { "deployment-flipper.watch": "true" }
            },
            "spec": {
                "selector": { "matchLabels": { "app": "web" } },
                "template": {
                    "spec": {
                        "initContainers": [{ "name": "migrate" }],
                        "containers": [{ "name": "app" }, { "name": "sidecar" }]
                    }
                }
            },
            "status": {
                "conditions": [
                    {
                        "type": "Available",
                        "status": "True",
                        "reason": "MinimumReplicasAvailable",
                        "lastUpdateTime": "2024-01-01T00:00:00Z"
                    },
                    {
                        "type": "Progressing",
                        "status": "True",
                        "reason": "NewReplicaSetAvailable",
                        "lastUpdateTime": "2024-01-01T00:05:00Z"
                    }
                ]
            }
        }));

        let snapshot = WorkloadSnapshot::from(&deploy);

        assert_eq!(snapshot.namespace, "default");
        assert_eq!(snapshot.name, "web");
        let names: Vec<_> = snapshot.containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["migrate", "app", "sidecar"]);
        assert_eq!(snapshot.conditions.len(), 2);
        assert_eq!(snapshot.conditions[0].kind, ConditionKind::Available);
        assert_eq!(snapshot.conditions[1].kind, ConditionKind::Progressing);
        assert_eq!(snapshot.conditions[1].status, ConditionStatus::True);
        assert_eq!(
            snapshot.conditions[1].reason.as_deref(),
            Some("NewReplicaSetAvailable")
        );
        assert_eq!(
            snapshot.conditions[1].last_update_time,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap())
        );
    }

    #[test]
    fn test_snapshot_without_status_or_spec() {
        let deploy = deployment(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "bare", "namespace": "default" }
        }));

        let snapshot = WorkloadSnapshot::from(&deploy);

        assert!(snapshot.conditions.is_empty());
        assert!(snapshot.containers.is_empty());
    }

    #[test]
    fn test_is_watched_requires_truthy_value() {
        let with_value = |value: &str| {
            deployment(json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": {
                    "name": "web",
                    "annotations": { "deployment-flipper.watch": value }
                }
            }))
        };

        assert!(is_watched(&with_value("true"), "deployment-flipper.watch"));
        assert!(is_watched(&with_value("TRUE"), "deployment-flipper.watch"));
        assert!(is_watched(&with_value("yes"), "deployment-flipper.watch"));
        assert!(!is_watched(&with_value("false"), "deployment-flipper.watch"));
        assert!(!is_watched(&with_value(""), "deployment-flipper.watch"));
        assert!(!is_watched(&with_value("true"), "other.watch"));
    }

    #[test]
    fn test_condition_parsing() {
        assert_eq!(ConditionKind::from("Available"), ConditionKind::Available);
        assert_eq!(
            ConditionKind::from("ReplicaFailure"),
            ConditionKind::Other("ReplicaFailure".to_string())
        );
        assert_eq!(ConditionStatus::from("True"), ConditionStatus::True);
        assert_eq!(ConditionStatus::from("False"), ConditionStatus::False);
        assert_eq!(ConditionStatus::from("Unknown"), ConditionStatus::Unknown);
        assert_eq!(ConditionStatus::from("true"), ConditionStatus::Unknown);
    }
}
