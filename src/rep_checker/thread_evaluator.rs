use crate::facts_collector::{ReplicaSource, SourceError};
use crate::rep_checker::Evaluator;
use crate::rep_checker::check_result::{CheckResult, SlaveSection, ThreadRecord, ThreadState};
use crate::rep_checker::topology::Topology;
use crate::shared::ThreadStatus;
use async_trait::async_trait;
use tracing::warn;

pub struct ThreadHealthEvaluator;

#[async_trait]
impl Evaluator for ThreadHealthEvaluator {
    async fn evaluate(&self, topology: &Topology) -> CheckResult {
        if topology.replicas.is_empty() {
            warn!(check = "CheckSlaveThread", "No slave instance detected");
            return CheckResult::ThreadStatus(SlaveSection::default());
        }
        let slaves = topology
            .for_each_replica(|replica| async move { check_threads(replica.as_ref()).await })
            .await;
        CheckResult::ThreadStatus(SlaveSection { slaves })
    }
}

/// Returns the (IO, SQL) thread states; the first matching rule wins.
pub fn classify_threads(status: &ThreadStatus) -> (ThreadState, ThreadState) {
    if !status.exists || !status.replica_running {
        (ThreadState::Down, ThreadState::Down)
    } else if !status.io_running {
        (ThreadState::Down, ThreadState::Up)
    } else if !status.sql_running {
        (ThreadState::Up, ThreadState::Down)
    } else {
        (ThreadState::Up, ThreadState::Up)
    }
}

pub async fn check_threads(replica: &dyn ReplicaSource) -> Result<ThreadRecord, SourceError> {
    // A server we cannot reach has no threads to report on.
    let (io_thread, sql_thread) = if replica.is_connected().await {
        classify_threads(&replica.thread_status().await?)
    } else {
        (ThreadState::Down, ThreadState::Down)
    };
    Ok(ThreadRecord {
        name: replica.name().to_string(),
        io_thread,
        sql_thread,
    })
}
