use crate::facts_collector::{ReplicaSource, SourceError};
use crate::rep_checker::Evaluator;
use crate::rep_checker::check_result::{CheckResult, OtherRecord, OtherStatus, SlaveSection};
use crate::rep_checker::topology::Topology;
use crate::shared::{OtherCounters, ServerVersion};
use async_trait::async_trait;
use tracing::warn;

/// More open temporary tables than this on a replica is flagged.
pub const MAX_TEMP_TABLES: u64 = 5;

pub struct OtherChecksEvaluator;

#[async_trait]
impl Evaluator for OtherChecksEvaluator {
    async fn evaluate(&self, topology: &Topology) -> CheckResult {
        if topology.replicas.is_empty() {
            warn!(check = "CheckSlaveOther", "No slave instance detected");
            return CheckResult::OtherChecks(SlaveSection::default());
        }
        let slaves = topology
            .for_each_replica(|replica| async move { check_other(replica.as_ref()).await })
            .await;
        CheckResult::OtherChecks(SlaveSection { slaves })
    }
}

pub async fn check_other(replica: &dyn ReplicaSource) -> Result<OtherRecord, SourceError> {
    if !replica.is_connected().await {
        return Ok(OtherRecord {
            name: replica.name().to_string(),
            status: OtherStatus::Down,
            skip_count: None,
            temp_table_count: None,
            retry_transaction_count: None,
        });
    }
    let counters = replica.other_counters().await?;
    Ok(evaluate_counters(replica.name(), &counters, replica.version()))
}

fn skip_counter_is_bad(skip: Option<u64>) -> bool {
    skip.is_none_or(|skip| skip > 0)
}

fn temp_tables_are_bad(temp_tables: Option<u64>) -> bool {
    temp_tables.is_none_or(|count| count > MAX_TEMP_TABLES)
}

/// Before 8.0 the retry counter can be unset on a failing channel, so unset
/// counts as bad there; from 8.0 on only a positive count does.
fn retries_are_bad(retries: Option<u64>, version: ServerVersion) -> bool {
    if version.major < 8 {
        retries.is_none_or(|count| count > 0)
    } else {
        retries.is_some_and(|count| count > 0)
    }
}

/// Combines the three counter checks into one verdict. Each flagged counter
/// is attached with the value that triggered it.
pub fn evaluate_counters(
    name: &str,
    counters: &OtherCounters,
    version: ServerVersion,
) -> OtherRecord {
    let mut record = OtherRecord {
        name: name.to_string(),
        status: OtherStatus::Good,
        skip_count: None,
        temp_table_count: None,
        retry_transaction_count: None,
    };

    if skip_counter_is_bad(counters.skip_counter) {
        record.skip_count = Some(counters.skip_counter);
        record.status = OtherStatus::Bad;
    }

    if temp_tables_are_bad(counters.temp_tables) {
        record.temp_table_count = Some(counters.temp_tables);
        record.status = OtherStatus::Bad;
    }

    if retries_are_bad(counters.retried_transactions, version) {
        record.retry_transaction_count = Some(counters.retried_transactions);
        record.status = OtherStatus::Bad;
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts_collector::static_facts_collector::StaticReplica;
    use serde_json::json;

    fn counters(skip: Option<u64>, temp: Option<u64>, retries: Option<u64>) -> OtherCounters {
        OtherCounters {
            skip_counter: skip,
            temp_tables: temp,
            retried_transactions: retries,
        }
    }

    #[test]
    fn test_all_good() {
        let record = evaluate_counters(
            "r1",
            &counters(Some(0), Some(5), Some(0)),
            ServerVersion::new(5, 7, 0),
        );
        assert_eq!(record.status, OtherStatus::Good);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"Name": "r1", "Status": "Good"})
        );
    }

    #[test]
    fn test_unset_skip_counter_is_bad() {
        let record = evaluate_counters(
            "r1",
            &counters(None, Some(3), Some(0)),
            ServerVersion::new(5, 7, 0),
        );
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"Name": "r1", "Status": "Bad", "SkipCount": null})
        );
    }

    #[test]
    fn test_temp_tables_threshold() {
        let version = ServerVersion::new(8, 0, 32);
        let over = evaluate_counters("r1", &counters(Some(0), Some(6), Some(0)), version);
        assert_eq!(over.status, OtherStatus::Bad);
        assert_eq!(over.temp_table_count, Some(Some(6)));
        let unset = evaluate_counters("r1", &counters(Some(0), None, Some(0)), version);
        assert_eq!(unset.temp_table_count, Some(None));
    }

    #[test]
    fn test_retry_version_split() {
        let unset_pre_8 = evaluate_counters(
            "r1",
            &counters(Some(0), Some(0), None),
            ServerVersion::new(5, 7, 30),
        );
        assert_eq!(unset_pre_8.status, OtherStatus::Bad);
        assert_eq!(unset_pre_8.retry_transaction_count, Some(None));

        let unset_8 = evaluate_counters(
            "r1",
            &counters(Some(0), Some(0), None),
            ServerVersion::new(8, 0, 32),
        );
        assert_eq!(unset_8.status, OtherStatus::Good);
        assert_eq!(unset_8.retry_transaction_count, None);

        let retried_8 = evaluate_counters(
            "r1",
            &counters(Some(0), Some(0), Some(2)),
            ServerVersion::new(8, 0, 32),
        );
        assert_eq!(retried_8.status, OtherStatus::Bad);
        assert_eq!(retried_8.retry_transaction_count, Some(Some(2)));
    }

    #[tokio::test]
    async fn test_down_replica_skips_counters() {
        let record = check_other(&StaticReplica::disconnected("r2")).await.unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"Name": "r2", "Status": "DOWN"})
        );
    }
}
