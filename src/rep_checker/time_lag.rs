//! Replication delay check with a single confirm-by-retry.
//!
//! A lag reading taken right after a write burst is noisy. Any reading other
//! than a confirmed zero is retried exactly once after `confirm_delay`; the
//! retried value is the one reported. There is no polling loop, so one
//! lagging replica adds at most one delay to the run.

use crate::facts_collector::{ReplicaSource, SourceError};
use crate::rep_checker::Evaluator;
use crate::rep_checker::check_result::{CheckResult, LagRecord, LagTime, SlaveSection};
use crate::rep_checker::missing_replicas::{checked_ids, missing_replicas};
use crate::rep_checker::topology::Topology;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Used in place of a replica UUID the monitor could not learn.
pub const UNKNOWN_UUID: &str = "Unknown";

pub struct TimeLagEvaluator;

#[async_trait]
impl Evaluator for TimeLagEvaluator {
    async fn evaluate(&self, topology: &Topology) -> CheckResult {
        CheckResult::TimeLag(check_time_lag(topology).await)
    }
}

pub async fn check_time_lag(topology: &Topology) -> SlaveSection<LagRecord> {
    if topology.replicas.is_empty() {
        warn!(check = "CheckSlaveTime", "No slave instance detected");
    }
    let delay = topology.options.confirm_delay;
    let mut slaves = topology
        .for_each_replica(|replica| async move { check_replica_lag(replica.as_ref(), delay).await })
        .await;

    match &topology.primary {
        Some(primary) => match primary.registered_replica_ids().await {
            Ok(registry) => {
                let checked = checked_ids(&slaves, &topology.replicas);
                let missing = missing_replicas(&registry, &checked);
                if !missing.is_empty() {
                    warn!(
                        count = missing.len(),
                        "Master reports slaves that are not in the inventory"
                    );
                }
                slaves.extend(missing);
            }
            Err(e) => {
                error!(server = %primary.name(), error = %e, "Cannot read master's slave registry");
            }
        },
        None => warn!(
            check = "CheckSlaveTime",
            "Missing master instance, skipping missing slave detection"
        ),
    }

    SlaveSection { slaves }
}

pub async fn check_replica_lag(
    replica: &dyn ReplicaSource,
    confirm_delay: Duration,
) -> Result<LagRecord, SourceError> {
    let name = replica.name().to_string();
    let slave_uuid = replica.uuid().unwrap_or_else(|| UNKNOWN_UUID.to_string());
    if !replica.is_connected().await {
        return Ok(LagRecord {
            name: Some(name),
            slave_uuid,
            lag_time: LagTime::Down,
        });
    }
    let reading = replica.lag_seconds().await?;
    let confirmed = process_time_lag(replica, reading, confirm_delay).await?;
    Ok(LagRecord {
        name: Some(name),
        slave_uuid,
        lag_time: LagTime::from_reading(confirmed),
    })
}

/// Confirms a lag reading. A zero reading is returned as is; anything else is
/// re-read once after `confirm_delay`, provided the replica is still connected.
pub async fn process_time_lag(
    replica: &dyn ReplicaSource,
    reading: Option<u64>,
    confirm_delay: Duration,
) -> Result<Option<u64>, SourceError> {
    if reading == Some(0) {
        return Ok(reading);
    }

    debug!(server = %replica.name(), lag = ?reading, "Confirming slave lag");
    tokio::time::sleep(confirm_delay).await;

    if !replica.is_connected().await {
        return Ok(reading);
    }
    replica.refresh_lag().await?;
    replica.lag_seconds().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts_collector::static_facts_collector::{StaticPrimary, StaticReplica};
    use crate::facts_collector::{PrimarySource, ReplicaSource};
    use crate::rep_checker::check_result::SlaveEntry;
    use crate::rep_checker::topology::CheckOptions;
    use crate::shared::{PrimaryStatus, ReplicaStatus};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn lagging(name: &str, uuid: &str, lag: Option<u64>) -> StaticReplica {
        StaticReplica::new(
            name,
            ReplicaStatus {
                uuid: Some(uuid.to_string()),
                lag_seconds: lag,
                ..ReplicaStatus::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_lag_skips_confirmation() {
        let replica = lagging("r1", "u1", Some(0)).with_refreshed_lag(Some(99));
        let started = Instant::now();
        let lag = process_time_lag(&replica, Some(0), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(lag, Some(0));
        assert_eq!(replica.refresh_calls(), 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_positive_lag_is_reread_once() {
        let replica = lagging("r1", "u1", Some(30)).with_refreshed_lag(Some(4));
        let started = Instant::now();
        let lag = process_time_lag(&replica, Some(30), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(lag, Some(4));
        assert_eq!(replica.refresh_calls(), 1);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_lag_is_reread_once() {
        let replica = lagging("r1", "u1", None).with_refreshed_lag(Some(0));
        let lag = process_time_lag(&replica, None, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(lag, Some(0));
        assert_eq!(replica.refresh_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagging_replicas_wait_in_parallel() {
        let replicas: Vec<Arc<dyn ReplicaSource>> = (0..4)
            .map(|i| {
                Arc::new(lagging(&format!("r{}", i), &format!("u{}", i), Some(10)))
                    as Arc<dyn ReplicaSource>
            })
            .collect();
        let topology = Topology::new(None, replicas, CheckOptions::default());
        let started = Instant::now();
        let section = check_time_lag(&topology).await;
        assert_eq!(section.slaves.len(), 4);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_time_lag_with_missing_and_down() {
        let primary: Arc<dyn PrimarySource> = Arc::new(StaticPrimary::new(
            "master",
            PrimaryStatus {
                replica_ids: vec!["u1".to_string(), "u2".to_string(), "u3".to_string()],
                ..PrimaryStatus::default()
            },
        ));
        let topology = Topology::new(
            Some(primary),
            vec![
                Arc::new(lagging("r1", "u1", Some(0))),
                Arc::new(lagging("r2", "u2", Some(12)).with_refreshed_lag(Some(8))),
                Arc::new(StaticReplica::disconnected("r4")),
            ],
            CheckOptions::default(),
        );
        let section = check_time_lag(&topology).await;
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            json!({"Slaves": [
                {"Name": "r1", "Slave_UUID": "u1", "LagTime": 0},
                {"Name": "r2", "Slave_UUID": "u2", "LagTime": 8},
                {"Name": "r4", "Slave_UUID": "Unknown", "LagTime": "DOWN"},
                {"Slave_UUID": "u3", "LagTime": "UNK"},
            ]})
        );
    }

    #[tokio::test]
    async fn test_down_replica_keeps_known_uuid() {
        let primary: Arc<dyn PrimarySource> = Arc::new(StaticPrimary::new(
            "master",
            PrimaryStatus {
                replica_ids: vec!["u1".to_string()],
                ..PrimaryStatus::default()
            },
        ));
        let down = StaticReplica::new(
            "r1",
            ReplicaStatus {
                connected: false,
                uuid: Some("u1".to_string()),
                ..ReplicaStatus::default()
            },
        );
        let topology = Topology::new(Some(primary), vec![Arc::new(down)], CheckOptions::default());
        let section = check_time_lag(&topology).await;
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            json!({"Slaves": [{"Name": "r1", "Slave_UUID": "u1", "LagTime": "DOWN"}]})
        );
    }

    #[tokio::test]
    async fn test_failed_replica_is_not_reported_missing() {
        let primary: Arc<dyn PrimarySource> = Arc::new(StaticPrimary::new(
            "master",
            PrimaryStatus {
                replica_ids: vec!["u1".to_string()],
                ..PrimaryStatus::default()
            },
        ));
        let topology = Topology::new(
            Some(primary),
            vec![Arc::new(lagging("r1", "u1", Some(0)).failing("lost connection"))],
            CheckOptions::default(),
        );
        let section = check_time_lag(&topology).await;
        assert_eq!(section.slaves.len(), 1);
        assert!(matches!(section.slaves[0], SlaveEntry::Failed(_)));
    }
}
