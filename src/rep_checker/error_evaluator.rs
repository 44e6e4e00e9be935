use crate::facts_collector::{ReplicaSource, SourceError};
use crate::rep_checker::Evaluator;
use crate::rep_checker::check_result::{
    ChannelReport, ChannelStatus, CheckResult, ConnectionState, ErrorRecord, SlaveSection,
};
use crate::rep_checker::topology::Topology;
use crate::shared::ChannelError;
use async_trait::async_trait;
use tracing::warn;

pub struct ErrorStatusEvaluator;

#[async_trait]
impl Evaluator for ErrorStatusEvaluator {
    async fn evaluate(&self, topology: &Topology) -> CheckResult {
        if topology.replicas.is_empty() {
            warn!(check = "CheckSlaveError", "No slave instance detected");
            return CheckResult::ErrorStatus(SlaveSection::default());
        }
        let slaves = topology
            .for_each_replica(|replica| async move { check_errors(replica.as_ref()).await })
            .await;
        CheckResult::ErrorStatus(SlaveSection { slaves })
    }
}

/// `Bad` only when an error code is reported. Servers before 5.6 report
/// nothing at all here, which reads as `Good`; error number 0 means no error.
pub fn channel_report(error: Option<&ChannelError>) -> ChannelReport {
    match error {
        Some(error) if error.code != 0 => ChannelReport {
            status: ChannelStatus::Bad,
            error: Some(error.code),
            message: Some(error.message.clone()),
            timestamp: Some(error.timestamp.clone()),
        },
        _ => ChannelReport::with_status(ChannelStatus::Good),
    }
}

pub async fn check_errors(replica: &dyn ReplicaSource) -> Result<ErrorRecord, SourceError> {
    let name = replica.name().to_string();
    if !replica.is_connected().await {
        return Ok(ErrorRecord {
            name,
            connection: ConnectionState::Down,
            io: ChannelReport::with_status(ChannelStatus::Unknown),
            sql: ChannelReport::with_status(ChannelStatus::Unknown),
        });
    }
    let errors = replica.error_status().await?;
    Ok(ErrorRecord {
        name,
        connection: ConnectionState::Up,
        io: channel_report(errors.io.as_ref()),
        sql: channel_report(errors.sql.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts_collector::static_facts_collector::StaticReplica;
    use crate::shared::{ErrorStatus, ReplicaStatus};
    use serde_json::json;

    fn io_error() -> ChannelError {
        ChannelError {
            code: 2003,
            message: Some("error connecting to master".to_string()),
            timestamp: Some("231019 08:44:01".to_string()),
        }
    }

    #[tokio::test]
    async fn test_io_error_does_not_touch_sql() {
        let replica = StaticReplica::new(
            "r1",
            ReplicaStatus {
                errors: ErrorStatus {
                    io: Some(io_error()),
                    sql: None,
                },
                ..ReplicaStatus::default()
            },
        );
        let record = check_errors(&replica).await.unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "Name": "r1",
                "Connection": "Up",
                "IO": {"Status": "Bad", "Error": 2003,
                       "Message": "error connecting to master", "Timestamp": "231019 08:44:01"},
                "SQL": {"Status": "Good"},
            })
        );
    }

    #[tokio::test]
    async fn test_sql_error_only() {
        let replica = StaticReplica::new(
            "r1",
            ReplicaStatus {
                errors: ErrorStatus {
                    io: None,
                    sql: Some(ChannelError {
                        code: 1062,
                        message: None,
                        timestamp: None,
                    }),
                },
                ..ReplicaStatus::default()
            },
        );
        let record = check_errors(&replica).await.unwrap();
        assert_eq!(record.io.status, ChannelStatus::Good);
        assert_eq!(record.sql.status, ChannelStatus::Bad);
        assert_eq!(record.sql.error, Some(1062));
        assert_eq!(record.sql.message, Some(None));
    }

    #[test]
    fn test_zero_code_is_good() {
        let report = channel_report(Some(&ChannelError::default()));
        assert_eq!(report, ChannelReport::with_status(ChannelStatus::Good));
    }

    #[tokio::test]
    async fn test_down_replica_is_unknown() {
        let record = check_errors(&StaticReplica::disconnected("r2")).await.unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"Name": "r2", "Connection": "DOWN",
                   "IO": {"Status": "Unknown"}, "SQL": {"Status": "Unknown"}})
        );
    }
}
