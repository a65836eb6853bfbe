//! # Stability
//!
//! Decides whether a Deployment's latest rollout has settled.
//!
//! A workload is stable only when both of these hold:
//! - an `Available` condition with status `True`
//! - a `Progressing` condition with status `True` and reason
//!   `NewReplicaSetAvailable`
//!
//! The stable-since time is the later of the two conditions' update times.
//! When the Available time is not strictly after the Progressing time, the
//! Progressing time is used. This tie-break is incidental, nothing relies on it.

use crate::constants::NEW_REPLICA_SET_AVAILABLE_REASON;
use crate::controller::workload::{ConditionKind, ConditionStatus, WorkloadCondition};
use chrono::{DateTime, Utc};

/// Result of classifying a workload's conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Rollout complete and available since the given time
    Stable { since: DateTime<Utc> },
    /// Mid-rollout, unavailable, or missing conditions
    NotStable,
}

impl Stability {
    #[must_use]
    pub fn is_stable(&self) -> bool {
        matches!(self, Stability::Stable { .. })
    }

    #[must_use]
    pub fn stable_since(&self) -> Option<DateTime<Utc>> {
        match self {
            Stability::Stable { since } => Some(*since),
            Stability::NotStable => None,
        }
    }
}

/// Classify a workload from its ordered condition list
///
/// The last matching condition of each type wins. A matching condition without
/// an update time still counts and contributes the Unix epoch.
#[must_use]
pub fn classify(conditions: &[WorkloadCondition]) -> Stability {
    let mut available: Option<DateTime<Utc>> = None;
    let mut progressing: Option<DateTime<Utc>> = None;

    for condition in conditions {
        if condition.status != ConditionStatus::True {
            continue;
        }
        let updated = condition.last_update_time.unwrap_or(DateTime::UNIX_EPOCH);
        match condition.kind {
            ConditionKind::Available => available = Some(updated),
            ConditionKind::Progressing
                if condition.reason.as_deref() == Some(NEW_REPLICA_SET_AVAILABLE_REASON) =>
            {
                progressing = Some(updated);
            }
            _ => {}
        }
    }

    match (available, progressing) {
        (Some(available), Some(progressing)) => Stability::Stable {
            since: if available > progressing {
                available
            } else {
                progressing
            },
        },
        _ => Stability::NotStable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn available(status: ConditionStatus, secs: i64) -> WorkloadCondition {
        WorkloadCondition {
            kind: ConditionKind::Available,
            status,
            reason: Some("MinimumReplicasAvailable".to_string()),
            last_update_time: Some(at(secs)),
        }
    }

    fn progressing(status: ConditionStatus, reason: &str, secs: i64) -> WorkloadCondition {
        WorkloadCondition {
            kind: ConditionKind::Progressing,
            status,
            reason: Some(reason.to_string()),
            last_update_time: Some(at(secs)),
        }
    }

    #[test]
    fn test_stable_uses_later_progressing_time() {
        let conditions = vec![
            available(ConditionStatus::True, 100),
            progressing(ConditionStatus::True, "NewReplicaSetAvailable", 200),
        ];
        assert_eq!(classify(&conditions), Stability::Stable { since: at(200) });
    }

    #[test]
    fn test_stable_uses_later_available_time() {
        let conditions = vec![
            progressing(ConditionStatus::True, "NewReplicaSetAvailable", 200),
            available(ConditionStatus::True, 300),
        ];
        assert_eq!(classify(&conditions), Stability::Stable { since: at(300) });
    }

    #[test]
    fn test_equal_times_are_stable() {
        let conditions = vec![
            available(ConditionStatus::True, 100),
            progressing(ConditionStatus::True, "NewReplicaSetAvailable", 100),
        ];
        assert_eq!(classify(&conditions).stable_since(), Some(at(100)));
    }

    #[test]
    fn test_missing_available_is_not_stable() {
        let conditions = vec![progressing(
            ConditionStatus::True,
            "NewReplicaSetAvailable",
            200,
        )];
        assert_eq!(classify(&conditions), Stability::NotStable);
    }

    #[test]
    fn test_missing_progressing_is_not_stable() {
        let conditions = vec![available(ConditionStatus::True, 100)];
        assert_eq!(classify(&conditions), Stability::NotStable);
    }

    #[test]
    fn test_false_available_is_not_stable() {
        let conditions = vec![
            available(ConditionStatus::False, 100),
            progressing(ConditionStatus::True, "NewReplicaSetAvailable", 200),
        ];
        assert!(!classify(&conditions).is_stable());
    }

    #[test]
    fn test_progressing_mid_rollout_is_not_stable() {
        let conditions = vec![
            available(ConditionStatus::True, 100),
            progressing(ConditionStatus::True, "ReplicaSetUpdated", 200),
        ];
        assert!(!classify(&conditions).is_stable());
    }

    #[test]
    fn test_unknown_status_is_not_stable() {
        let conditions = vec![
            available(ConditionStatus::True, 100),
            progressing(ConditionStatus::Unknown, "NewReplicaSetAvailable", 200),
        ];
        assert!(!classify(&conditions).is_stable());
    }

    #[test]
    fn test_empty_conditions_are_not_stable() {
        assert_eq!(classify(&[]), Stability::NotStable);
        assert_eq!(Stability::NotStable.stable_since(), None);
    }

    #[test]
    fn test_last_matching_condition_wins() {
        let conditions = vec![
            available(ConditionStatus::True, 100),
            progressing(ConditionStatus::True, "NewReplicaSetAvailable", 150),
            available(ConditionStatus::True, 400),
        ];
        assert_eq!(classify(&conditions).stable_since(), Some(at(400)));
    }

    #[test]
    fn test_missing_update_time_counts_as_epoch() {
        let mut no_time = available(ConditionStatus::True, 0);
        no_time.last_update_time = None;
        let conditions = vec![
            no_time,
            progressing(ConditionStatus::True, "NewReplicaSetAvailable", 50),
        ];
        assert_eq!(classify(&conditions).stable_since(), Some(at(50)));
    }
}
