use crate::facts_collector::{ReplicaSource, SourceError};
use crate::rep_checker::Evaluator;
use crate::rep_checker::check_result::{
    BinlogComparison, CheckResult, ExecutionInfo, LogStatus, LogVerdict, MasterPositionRecord,
    ReadPositionInfo,
};
use crate::rep_checker::topology::Topology;
use crate::shared::LogPosition;
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// Compares each replica's read position with the primary's current position
/// and each replica's read position with its own executed position.
pub struct BinlogComparator;

#[async_trait]
impl Evaluator for BinlogComparator {
    async fn evaluate(&self, topology: &Topology) -> CheckResult {
        CheckResult::BinlogComparison(compare_binlogs(topology).await)
    }
}

pub async fn compare_binlogs(topology: &Topology) -> BinlogComparison {
    let mut result = BinlogComparison::default();

    if topology.primary.is_none() && topology.replicas.is_empty() {
        warn!(check = "CheckMasterLog", "Missing master and slave instances");
        return result;
    }

    let primary_position = match &topology.primary {
        Some(_) if topology.replicas.is_empty() => {
            warn!(check = "CheckMasterLog", "No slave instances detected");
            None
        }
        Some(primary) => match primary.log_info().await {
            Ok(info) => Some((primary.name().to_string(), info.position)),
            Err(e) => {
                error!(server = %primary.name(), error = %e, "Cannot read master log position");
                None
            }
        },
        None => {
            warn!(check = "CheckMasterLog", "Missing master instance");
            None
        }
    };

    if let Some((name, position)) = primary_position {
        result.master_log.master = Some(MasterPositionRecord {
            name,
            log: position.file.clone(),
            position: position.position,
        });
        let slaves = topology
            .for_each_replica(|replica| {
                let expected = position.clone();
                async move { compare_with_primary(replica.as_ref(), &expected).await }
            })
            .await;
        result.master_log.slaves = Some(slaves);
    }

    result.slave_logs = topology
        .for_each_replica(|replica| async move { check_execution(replica.as_ref()).await })
        .await;

    result
}

/// `OK` when the replica has read exactly up to the primary's position.
pub async fn compare_with_primary(
    replica: &dyn ReplicaSource,
    expected: &LogPosition,
) -> Result<LogVerdict<ReadPositionInfo>, SourceError> {
    if !replica.is_connected().await {
        return Ok(LogVerdict::down(replica.name()));
    }
    let info = replica.log_info().await?;
    if info.read == *expected {
        return Ok(LogVerdict::ok(replica.name()));
    }
    debug!(server = %replica.name(), read = %info.read, master = %expected, "Slave behind master log");
    Ok(LogVerdict {
        name: replica.name().to_string(),
        status: LogStatus::LaggingInRead,
        info: Some(ReadPositionInfo {
            log: info.read.file,
            position: info.read.position,
        }),
    })
}

/// `OK` when the replica has applied everything it has read.
pub async fn check_execution(
    replica: &dyn ReplicaSource,
) -> Result<LogVerdict<ExecutionInfo>, SourceError> {
    if !replica.is_connected().await {
        return Ok(LogVerdict::down(replica.name()));
    }
    let info = replica.log_info().await?;
    if info.read == info.exec {
        return Ok(LogVerdict::ok(replica.name()));
    }
    let (retrieved_gtid, executed_gtid) = if info.gtid_mode {
        (Some(info.retrieved_gtid), Some(info.executed_gtid))
    } else {
        (None, None)
    };
    Ok(LogVerdict {
        name: replica.name().to_string(),
        status: LogStatus::LaggingInExecution,
        info: Some(ExecutionInfo {
            read_log: info.read.file,
            read_position: info.read.position,
            exec_log: info.exec.file,
            exec_position: info.exec.position,
            retrieved_gtid,
            executed_gtid,
        }),
    })
}
