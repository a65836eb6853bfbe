//! Common test utilities for reconciliation tests
//!
//! Provides an in-memory `ClusterGateway`, a controllable clock, and builders
//! for workload snapshots.

#![allow(dead_code, reason = "Each test binary uses a different subset")]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use deployment_flipper::prelude::*;
use k8s_openapi::api::core::v1::Container;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const NAMESPACE: &str = "default";

/// Fixed reference instant used as "stable since" in scenarios
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn t0_plus(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

/// Clock whose time only moves when told to
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn at(time: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(time)))
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.0.lock().unwrap() = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    workloads: Vec<WorkloadSnapshot>,
    list_fails: bool,
    /// name -> annotation content; absent means the object does not exist
    config_maps: HashMap<String, Option<String>>,
    secrets: HashMap<String, Option<String>>,
    failing_restarts: Vec<String>,
    restarts: Vec<(String, String)>,
    fetches: Vec<(ConfigKind, String)>,
}

/// Scripted in-memory cluster
#[derive(Debug, Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

fn unavailable(what: &str) -> GatewayError {
    GatewayError::Kube(kube::Error::Service(format!("{what} unavailable").into()))
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_workloads(&self, workloads: Vec<WorkloadSnapshot>) {
        self.state.lock().unwrap().workloads = workloads;
    }

    pub fn fail_listing(&self, fail: bool) {
        self.state.lock().unwrap().list_fails = fail;
    }

    /// Store a ConfigMap whose last applied configuration is `content`
    pub fn put_config_map(&self, name: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .config_maps
            .insert(name.to_string(), Some(content.to_string()));
    }

    /// Store a ConfigMap that was never applied with kubectl
    pub fn put_unapplied_config_map(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .config_maps
            .insert(name.to_string(), None);
    }

    pub fn put_secret(&self, name: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .secrets
            .insert(name.to_string(), Some(content.to_string()));
    }

    pub fn fail_restart_of(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_restarts
            .push(name.to_string());
    }

    pub fn clear_restart_failures(&self) {
        self.state.lock().unwrap().failing_restarts.clear();
    }

    /// Successful restarts as (name, namespace)
    pub fn restarts(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().restarts.clone()
    }

    pub fn restart_count(&self, name: &str) -> usize {
        self.restarts().iter().filter(|(n, _)| n == name).count()
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches.len()
    }

    fn fingerprint(
        &self,
        kind: ConfigKind,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push((kind, name.to_string()));
        let objects = match kind {
            ConfigKind::ConfigMap => &state.config_maps,
            ConfigKind::Secret => &state.secrets,
        };
        match objects.get(name) {
            Some(Some(content)) => Ok(fingerprint_of(content)),
            Some(None) => Err(GatewayError::MissingAnnotation {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            None => Err(unavailable(&format!("{kind} {namespace}/{name}"))),
        }
    }
}

#[async_trait]
impl ClusterGateway for FakeGateway {
    async fn list_watched_workloads(
        &self,
        namespace: &str,
    ) -> Result<Vec<WorkloadSnapshot>, GatewayError> {
        let state = self.state.lock().unwrap();
        if state.list_fails {
            return Err(unavailable("deployments"));
        }
        Ok(state
            .workloads
            .iter()
            .filter(|w| w.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn get_config_map_fingerprint(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError> {
        self.fingerprint(ConfigKind::ConfigMap, name, namespace)
    }

    async fn get_secret_fingerprint(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<String, GatewayError> {
        self.fingerprint(ConfigKind::Secret, name, namespace)
    }

    async fn restart_workload(&self, name: &str, namespace: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_restarts.iter().any(|n| n == name) {
            return Err(unavailable(&format!("deployment {namespace}/{name}")));
        }
        state
            .restarts
            .push((name.to_string(), namespace.to_string()));
        Ok(())
    }
}

pub fn container(value: serde_json::Value) -> Container {
    serde_json::from_value(value).expect("valid container spec")
}

/// Container consuming the given ConfigMaps and Secrets in bulk
pub fn container_with(name: &str, config_maps: &[&str], secrets: &[&str]) -> Container {
    let env_from: Vec<serde_json::Value> = config_maps
        .iter()
        .map(|cm| serde_json::json!({ "configMapRef": { "name": cm } }))
        .chain(
            secrets
                .iter()
                .map(|s| serde_json::json!({ "secretRef": { "name": s } })),
        )
        .collect();
    container(serde_json::json!({ "name": name, "envFrom": env_from }))
}

fn condition(
    kind: ConditionKind,
    status: ConditionStatus,
    reason: &str,
    at: DateTime<Utc>,
) -> WorkloadCondition {
    WorkloadCondition {
        kind,
        status,
        reason: Some(reason.to_string()),
        last_update_time: Some(at),
    }
}

/// Workload whose rollout settled at `since`
pub fn stable_workload(
    name: &str,
    since: DateTime<Utc>,
    containers: Vec<Container>,
) -> WorkloadSnapshot {
    WorkloadSnapshot {
        namespace: NAMESPACE.to_string(),
        name: name.to_string(),
        conditions: vec![
            condition(
                ConditionKind::Available,
                ConditionStatus::True,
                "MinimumReplicasAvailable",
                since - Duration::seconds(5),
            ),
            condition(
                ConditionKind::Progressing,
                ConditionStatus::True,
                "NewReplicaSetAvailable",
                since,
            ),
        ],
        containers,
    }
}

/// Workload still rolling out
pub fn rolling_workload(name: &str, containers: Vec<Container>) -> WorkloadSnapshot {
    WorkloadSnapshot {
        namespace: NAMESPACE.to_string(),
        name: name.to_string(),
        conditions: vec![
            condition(
                ConditionKind::Available,
                ConditionStatus::True,
                "MinimumReplicasAvailable",
                t0(),
            ),
            condition(
                ConditionKind::Progressing,
                ConditionStatus::True,
                "ReplicaSetUpdated",
                t0(),
            ),
        ],
        containers,
    }
}

pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<FingerprintStore>,
    pub reconciler: Reconciler,
}

/// Reconciler for `NAMESPACE` over a fake cluster and manual clock set to `now`
pub fn harness(now: DateTime<Utc>) -> Harness {
    let gateway = FakeGateway::new();
    let clock = ManualClock::at(now);
    let store = Arc::new(FingerprintStore::with_clock(clock.clone()));
    let reconciler = Reconciler::new(gateway.clone(), Arc::clone(&store), NAMESPACE);
    Harness {
        gateway,
        clock,
        store,
        reconciler,
    }
}
