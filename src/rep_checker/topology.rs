use crate::facts_collector::{PrimarySource, ReplicaSource, SourceError};
use crate::rep_checker::check_result::{FailedRecord, SlaveEntry};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, warn};

pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Wait before re-reading a non-zero or unknown lag.
    pub confirm_delay: Duration,
    /// Upper bound on replicas evaluated at the same time.
    pub max_concurrency: usize,
    /// Budget for the whole run; replicas not finished in time are marked incomplete.
    pub run_timeout: Option<Duration>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            confirm_delay: DEFAULT_CONFIRM_DELAY,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            run_timeout: None,
        }
    }
}

/// The servers one run checks. Built per run; the handles themselves are owned
/// by the collector that opened them.
pub struct Topology {
    pub primary: Option<Arc<dyn PrimarySource>>,
    pub replicas: Vec<Arc<dyn ReplicaSource>>,
    pub options: CheckOptions,
    deadline: Option<Instant>,
}

impl Topology {
    pub fn new(
        primary: Option<Arc<dyn PrimarySource>>,
        replicas: Vec<Arc<dyn ReplicaSource>>,
        options: CheckOptions,
    ) -> Self {
        let deadline = options.run_timeout.map(|timeout| Instant::now() + timeout);
        Self {
            primary,
            replicas,
            options,
            deadline,
        }
    }

    pub fn primary_name(&self) -> Option<&str> {
        self.primary.as_ref().map(|primary| primary.name())
    }

    /// Runs `check` for every replica and returns one entry per replica in
    /// inventory order.
    ///
    /// Replicas are evaluated concurrently, at most `max_concurrency` at a
    /// time. An error from one replica becomes that replica's `ERROR` entry
    /// and never affects its siblings.
    pub async fn for_each_replica<T, F, Fut>(&self, check: F) -> Vec<SlaveEntry<T>>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn ReplicaSource>) -> Fut,
        Fut: Future<Output = Result<T, SourceError>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let mut set = JoinSet::new();

        for (idx, replica) in self.replicas.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = check(Arc::clone(replica));
            let deadline = self.deadline;
            set.spawn(async move {
                let bounded = async move {
                    let _permit = semaphore.acquire_owned().await;
                    work.await
                };
                let outcome = match deadline {
                    Some(deadline) => tokio::time::timeout_at(deadline, bounded).await.ok(),
                    None => Some(bounded.await),
                };
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<SlaveEntry<T>>> = self.replicas.iter().map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, Some(Ok(record)))) => slots[idx] = Some(SlaveEntry::Checked(record)),
                Ok((idx, Some(Err(e)))) => {
                    let name = self.replicas[idx].name();
                    error!(server = %name, error = %e, "Slave check failed");
                    slots[idx] = Some(SlaveEntry::Failed(FailedRecord::error(name, e.to_string())));
                }
                Ok((idx, None)) => {
                    let name = self.replicas[idx].name();
                    warn!(server = %name, "Run deadline passed before slave check finished");
                    slots[idx] = Some(SlaveEntry::Failed(FailedRecord::incomplete(name)));
                }
                Err(e) => {
                    error!(error = %e, "Slave check task aborted");
                }
            }
        }

        slots
            .into_iter()
            .zip(self.replicas.iter())
            .map(|(slot, replica)| {
                slot.unwrap_or_else(|| {
                    SlaveEntry::Failed(FailedRecord::error(replica.name(), "check task aborted"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts_collector::static_facts_collector::StaticReplica;
    use crate::rep_checker::check_result::FailureStatus;
    use crate::shared::ReplicaStatus;

    fn topology(replicas: Vec<Arc<dyn ReplicaSource>>, options: CheckOptions) -> Topology {
        Topology::new(None, replicas, options)
    }

    #[tokio::test]
    async fn test_results_keep_inventory_order() {
        let replicas: Vec<Arc<dyn ReplicaSource>> = (0..5)
            .map(|i| {
                Arc::new(StaticReplica::new(
                    format!("slave{}", i),
                    ReplicaStatus::default(),
                )) as Arc<dyn ReplicaSource>
            })
            .collect();
        let topology = topology(
            replicas,
            CheckOptions {
                max_concurrency: 2,
                ..CheckOptions::default()
            },
        );
        let entries = topology
            .for_each_replica(|replica| async move { Ok::<_, SourceError>(replica.name().to_string()) })
            .await;
        let names: Vec<&str> = entries
            .iter()
            .filter_map(|entry| entry.checked().map(String::as_str))
            .collect();
        assert_eq!(names, vec!["slave0", "slave1", "slave2", "slave3", "slave4"]);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_blank_siblings() {
        let replicas: Vec<Arc<dyn ReplicaSource>> = vec![
            Arc::new(StaticReplica::new("slave1", ReplicaStatus::default())),
            Arc::new(StaticReplica::new("slave2", ReplicaStatus::default()).failing("timeout")),
            Arc::new(StaticReplica::new("slave3", ReplicaStatus::default())),
        ];
        let topology = topology(replicas, CheckOptions::default());
        let entries = topology
            .for_each_replica(|replica| async move { replica.lag_seconds().await })
            .await;
        assert_eq!(entries[0], SlaveEntry::Checked(None));
        assert!(entries[1].is_failed());
        assert_eq!(entries[2], SlaveEntry::Checked(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_marks_unfinished_replicas() {
        let replicas: Vec<Arc<dyn ReplicaSource>> = vec![
            Arc::new(StaticReplica::new("fast", ReplicaStatus::default())),
            Arc::new(StaticReplica::new("slow", ReplicaStatus::default())),
        ];
        let topology = topology(
            replicas,
            CheckOptions {
                run_timeout: Some(Duration::from_secs(2)),
                ..CheckOptions::default()
            },
        );
        let entries = topology
            .for_each_replica(|replica| async move {
                if replica.name() == "slow" {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
                Ok::<_, SourceError>(replica.name().to_string())
            })
            .await;
        assert_eq!(entries[0], SlaveEntry::Checked("fast".to_string()));
        match &entries[1] {
            SlaveEntry::Failed(record) => {
                assert_eq!(record.name, "slow");
                assert_eq!(record.status, FailureStatus::Incomplete);
            }
            other => panic!("expected incomplete marker, got {:?}", other),
        }
    }
}
