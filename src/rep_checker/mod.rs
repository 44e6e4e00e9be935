//! Replication checks: one evaluator per check kind.
//!
//! Every evaluator turns the status of the servers in a [`Topology`] into a
//! [`CheckResult`]. Absent servers are never an error: an evaluator with
//! nothing to look at logs a notice and returns an empty section.

pub mod binlog_comparator;
pub mod check_result;
pub mod error_evaluator;
pub mod log_reports;
pub mod missing_replicas;
pub mod other_checks;
pub mod thread_evaluator;
pub mod time_lag;
pub mod topology;

use async_trait::async_trait;

pub use binlog_comparator::BinlogComparator;
pub use check_result::CheckResult;
pub use error_evaluator::ErrorStatusEvaluator;
pub use log_reports::{MasterLogReporter, SlaveLogReporter};
pub use other_checks::OtherChecksEvaluator;
pub use thread_evaluator::ThreadHealthEvaluator;
pub use time_lag::TimeLagEvaluator;
pub use topology::{CheckOptions, Topology};

#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, topology: &Topology) -> CheckResult;
}
