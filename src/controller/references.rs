//! # References
//!
//! Collects the ConfigMaps and Secrets a workload consumes through its
//! containers' environment.
//!
//! Two mechanisms are scanned independently for every container:
//! - `env[].valueFrom.configMapKeyRef` / `env[].valueFrom.secretKeyRef`
//! - `envFrom[].configMapRef` / `envFrom[].secretRef`
//!
//! Volume mounts are not considered; a mounted ConfigMap is picked up by the
//! kubelet without a restart.

use crate::store::ConfigKind;
use k8s_openapi::api::core::v1::Container;
use std::collections::BTreeSet;

/// Distinct configuration object names referenced by a workload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedConfigs {
    pub config_maps: BTreeSet<String>,
    pub secrets: BTreeSet<String>,
}

impl ReferencedConfigs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.config_maps.is_empty() && self.secrets.is_empty()
    }

    /// Total number of distinct references across both kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.config_maps.len() + self.secrets.len()
    }

    /// Names referenced for the given kind
    #[must_use]
    pub fn names(&self, kind: ConfigKind) -> &BTreeSet<String> {
        match kind {
            ConfigKind::ConfigMap => &self.config_maps,
            ConfigKind::Secret => &self.secrets,
        }
    }

    fn insert(&mut self, kind: ConfigKind, name: &str) {
        if name.is_empty() {
            return;
        }
        match kind {
            ConfigKind::ConfigMap => self.config_maps.insert(name.to_string()),
            ConfigKind::Secret => self.secrets.insert(name.to_string()),
        };
    }
}

/// Extract referenced ConfigMap and Secret names from a set of containers
///
/// Never fails: absent or partial references are skipped.
#[must_use]
pub fn extract_references<'a, I>(containers: I) -> ReferencedConfigs
where
    I: IntoIterator<Item = &'a Container>,
{
    let mut refs = ReferencedConfigs::default();

    for container in containers {
        for source in container
            .env
            .iter()
            .flatten()
            .filter_map(|env| env.value_from.as_ref())
        {
            if let Some(selector) = &source.config_map_key_ref {
                refs.insert(ConfigKind::ConfigMap, &selector.name);
            }
            if let Some(selector) = &source.secret_key_ref {
                refs.insert(ConfigKind::Secret, &selector.name);
            }
        }

        for source in container.env_from.iter().flatten() {
            if let Some(config_map) = &source.config_map_ref {
                refs.insert(ConfigKind::ConfigMap, &config_map.name);
            }
            if let Some(secret) = &source.secret_ref {
                refs.insert(ConfigKind::Secret, &secret.name);
            }
        }
    }

    refs
}
