//! # Fingerprints
//!
//! Tracks, per configuration object, the fingerprint last observed and the time
//! that fingerprint was first observed.
//!
//! The object's own modification metadata is never consulted. A change time is
//! reconstructed purely from content equality: the first time the store sees a
//! new fingerprint for a key, that moment becomes the key's `changed_at`.
//! Re-observing the same content leaves it untouched.
//!
//! Entries are never evicted. The key space is bounded by the configuration
//! objects referenced from watched namespaces, and entries for deleted objects
//! are simply never read again.

use crate::store::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Kind of configuration object a workload can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKind {
    ConfigMap,
    Secret,
}

impl ConfigKind {
    /// Label used in logs and metrics
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::ConfigMap => "configmap",
            ConfigKind::Secret => "secret",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::ConfigMap => f.write_str("ConfigMap"),
            ConfigKind::Secret => f.write_str("Secret"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FingerprintKey {
    namespace: String,
    kind: ConfigKind,
    name: String,
}

/// Last observed state of one configuration object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    pub fingerprint: String,
    pub changed_at: DateTime<Utc>,
}

/// Derive the fingerprint for a piece of configuration content
///
/// SHA-256, hex encoded. Only the digest is retained so secret material never
/// lives in the store.
#[must_use]
pub fn fingerprint_of(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// Content-addressed change-time cache shared by every reconciler
pub struct FingerprintStore {
    records: Mutex<HashMap<FingerprintKey, FingerprintRecord>>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for FingerprintStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintStore")
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for FingerprintStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintStore {
    /// Create an empty store using the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with an injected clock
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Record an observation and return the time the current fingerprint was
    /// first seen
    ///
    /// - unknown key: stored with `changed_at = now`, returns now
    /// - same fingerprint: returns the stored `changed_at` untouched
    /// - different fingerprint: replaced with `changed_at = now`, returns now
    ///
    /// `changed_at` strictly increases on every change, even if the clock
    /// stalls or steps backwards.
    pub fn observe(
        &self,
        namespace: &str,
        kind: ConfigKind,
        name: &str,
        fingerprint: &str,
    ) -> DateTime<Utc> {
        let key = FingerprintKey {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
        };

        // The whole read-compare-write runs under one guard. Every mutation is a
        // single insert, so a poisoned map is still consistent.
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();

        match records.get_mut(&key) {
            Some(record) if record.fingerprint == fingerprint => record.changed_at,
            Some(record) => {
                let changed_at = if now > record.changed_at {
                    now
                } else {
                    record.changed_at + Duration::nanoseconds(1)
                };
                record.fingerprint = fingerprint.to_string();
                record.changed_at = changed_at;
                changed_at
            }
            None => {
                records.insert(
                    key,
                    FingerprintRecord {
                        fingerprint: fingerprint.to_string(),
                        changed_at: now,
                    },
                );
                now
            }
        }
    }

    /// Look up the stored record without modifying it
    #[must_use]
    pub fn get(&self, namespace: &str, kind: ConfigKind, name: &str) -> Option<FingerprintRecord> {
        let key = FingerprintKey {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Number of tracked configuration objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
