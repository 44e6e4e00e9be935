use crate::facts_collector::{ReplicaSource, SourceError};
use crate::rep_checker::Evaluator;
use crate::rep_checker::check_result::{CheckResult, MasterLogReport, Reported, SlaveLogRecord};
use crate::rep_checker::topology::Topology;
use async_trait::async_trait;
use tracing::{error, warn};

/// Raw binlog coordinates of the primary.
pub struct MasterLogReporter;

#[async_trait]
impl Evaluator for MasterLogReporter {
    async fn evaluate(&self, topology: &Topology) -> CheckResult {
        let mut report = MasterLogReport::default();
        let Some(primary) = &topology.primary else {
            warn!(check = "MasterLog", "No master instance detected");
            return CheckResult::MasterLogReport(report);
        };
        match primary.log_info().await {
            Ok(info) => {
                report.master = Some(primary.name().to_string());
                report.master_log = Some(info.position.file);
                report.log_position = Some(info.position.position);
                if info.gtid_mode {
                    report.gtid_position = Some(info.executed_gtid);
                }
            }
            Err(e) => {
                error!(server = %primary.name(), error = %e, "Cannot read master log position");
            }
        }
        CheckResult::MasterLogReport(report)
    }
}

/// Raw read and relay coordinates of every replica.
pub struct SlaveLogReporter;

#[async_trait]
impl Evaluator for SlaveLogReporter {
    async fn evaluate(&self, topology: &Topology) -> CheckResult {
        if topology.replicas.is_empty() {
            warn!(check = "SlaveLogs", "No slave instances detected");
            return CheckResult::ReplicaLogReport(Vec::new());
        }
        let slaves = topology
            .for_each_replica(|replica| async move { slave_log(replica.as_ref()).await })
            .await;
        CheckResult::ReplicaLogReport(slaves)
    }
}

pub async fn slave_log(replica: &dyn ReplicaSource) -> Result<SlaveLogRecord, SourceError> {
    if !replica.is_connected().await {
        return Ok(SlaveLogRecord {
            slave: replica.name().to_string(),
            master_file: Reported::Unknown,
            master_position: Reported::Unknown,
            relay_file: Reported::Unknown,
            exec_position: Reported::Unknown,
            retrieved_gtid: None,
        });
    }
    let info = replica.log_info().await?;
    Ok(SlaveLogRecord {
        slave: replica.name().to_string(),
        master_file: Reported::Known(info.read.file),
        master_position: Reported::Known(info.read.position),
        relay_file: Reported::Known(info.exec.file),
        exec_position: Reported::Known(info.exec.position),
        retrieved_gtid: info.gtid_mode.then_some(info.retrieved_gtid),
    })
}
