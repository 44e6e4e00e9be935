use crate::rep_checker::CheckResult;
use crate::rep_checker::check_result::SlaveEntry;
use chrono::Local;
use serde::Serialize;

pub const APPLICATION: &str = "MySQLReplication";
pub const AS_OF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One run's output, in the order the checks were run.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Report {
    #[serde(rename = "Application")]
    pub application: String,
    #[serde(rename = "Master")]
    pub master: Option<String>,
    #[serde(rename = "AsOf")]
    pub as_of: String,
    #[serde(rename = "Checks")]
    pub checks: Vec<CheckResult>,
}

impl Report {
    pub fn new(master: Option<String>) -> Self {
        Self {
            application: APPLICATION.to_string(),
            master,
            as_of: Local::now().format(AS_OF_FORMAT).to_string(),
            checks: Vec::new(),
        }
    }

    /// True when the first check is a lag check with at least one replica
    /// not confirmed at zero. A failed or incomplete replica counts as lag.
    pub fn has_time_lag(&self) -> bool {
        match self.checks.first() {
            Some(CheckResult::TimeLag(section)) => section.slaves.iter().any(|entry| match entry {
                SlaveEntry::Checked(record) => !record.lag_time.is_zero(),
                SlaveEntry::Failed(_) => true,
            }),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rep_checker::check_result::{FailedRecord, LagRecord, LagTime, SlaveSection};

    fn lag_report(lags: &[LagTime]) -> Report {
        let mut report = Report::new(Some("master".to_string()));
        report.checks.push(CheckResult::TimeLag(SlaveSection {
            slaves: lags
                .iter()
                .enumerate()
                .map(|(i, lag)| {
                    SlaveEntry::Checked(LagRecord {
                        name: Some(format!("slave{}", i)),
                        slave_uuid: format!("u{}", i),
                        lag_time: *lag,
                    })
                })
                .collect(),
        }));
        report
    }

    #[test]
    fn test_envelope() {
        let report = Report::new(None);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["Application"], "MySQLReplication");
        assert!(value["Master"].is_null());
        assert_eq!(value["AsOf"].as_str().unwrap().len(), 19);
        assert_eq!(value["Checks"], serde_json::json!([]));
    }

    #[test]
    fn test_has_time_lag() {
        assert!(!lag_report(&[LagTime::Seconds(0), LagTime::Seconds(0)]).has_time_lag());
        assert!(lag_report(&[LagTime::Seconds(0), LagTime::Seconds(3)]).has_time_lag());
        assert!(lag_report(&[LagTime::Unknown]).has_time_lag());
        assert!(lag_report(&[LagTime::Down]).has_time_lag());
        assert!(lag_report(&[LagTime::Missing]).has_time_lag());
        assert!(!lag_report(&[]).has_time_lag());
        assert!(!Report::new(None).has_time_lag());
    }

    #[test]
    fn test_failed_entry_counts_as_lag() {
        let mut report = Report::new(None);
        report.checks.push(CheckResult::TimeLag(SlaveSection {
            slaves: vec![SlaveEntry::Failed(FailedRecord::incomplete("slave1"))],
        }));
        assert!(report.has_time_lag());
    }
}
