//! Typed result tree for every check kind.
//!
//! Field names follow the JSON documents downstream consumers already parse
//! (`CheckSlaveTime.Slaves[].LagTime` and friends). Optional fields are only
//! written when the condition that produces them was met.

use serde::{Serialize, Serializer};

/// Result of one check, keyed by its section name when serialized.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum CheckResult {
    #[serde(rename = "MasterLog")]
    MasterLogReport(MasterLogReport),
    #[serde(rename = "SlaveLogs")]
    ReplicaLogReport(Vec<SlaveEntry<SlaveLogRecord>>),
    #[serde(rename = "CheckMasterLog")]
    BinlogComparison(BinlogComparison),
    #[serde(rename = "CheckSlaveThread")]
    ThreadStatus(SlaveSection<ThreadRecord>),
    #[serde(rename = "CheckSlaveError")]
    ErrorStatus(SlaveSection<ErrorRecord>),
    #[serde(rename = "CheckSlaveTime")]
    TimeLag(SlaveSection<LagRecord>),
    #[serde(rename = "CheckSlaveOther")]
    OtherChecks(SlaveSection<OtherRecord>),
}

impl CheckResult {
    pub fn section_name(&self) -> &'static str {
        match self {
            CheckResult::MasterLogReport(_) => "MasterLog",
            CheckResult::ReplicaLogReport(_) => "SlaveLogs",
            CheckResult::BinlogComparison(_) => "CheckMasterLog",
            CheckResult::ThreadStatus(_) => "CheckSlaveThread",
            CheckResult::ErrorStatus(_) => "CheckSlaveError",
            CheckResult::TimeLag(_) => "CheckSlaveTime",
            CheckResult::OtherChecks(_) => "CheckSlaveOther",
        }
    }

    /// Number of replicas whose evaluation failed or did not finish.
    pub fn failure_count(&self) -> usize {
        fn count<T>(entries: &[SlaveEntry<T>]) -> usize {
            entries.iter().filter(|entry| entry.is_failed()).count()
        }
        match self {
            CheckResult::MasterLogReport(_) => 0,
            CheckResult::ReplicaLogReport(entries) => count(entries),
            CheckResult::BinlogComparison(comparison) => {
                count(&comparison.slave_logs)
                    + comparison
                        .master_log
                        .slaves
                        .as_deref()
                        .map(count)
                        .unwrap_or(0)
            }
            CheckResult::ThreadStatus(section) => count(&section.slaves),
            CheckResult::ErrorStatus(section) => count(&section.slaves),
            CheckResult::TimeLag(section) => count(&section.slaves),
            CheckResult::OtherChecks(section) => count(&section.slaves),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlaveSection<T> {
    #[serde(rename = "Slaves")]
    pub slaves: Vec<SlaveEntry<T>>,
}

impl<T> Default for SlaveSection<T> {
    fn default() -> Self {
        Self { slaves: Vec::new() }
    }
}

/// Per-replica outcome: either the check's own record or a failure marker.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SlaveEntry<T> {
    Checked(T),
    Failed(FailedRecord),
}

impl<T> SlaveEntry<T> {
    pub fn checked(&self) -> Option<&T> {
        match self {
            SlaveEntry::Checked(record) => Some(record),
            SlaveEntry::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SlaveEntry::Failed(_))
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStatus {
    /// Contacting the server raised an error.
    #[serde(rename = "ERROR")]
    Error,
    /// The run deadline passed before the replica was evaluated.
    #[serde(rename = "INCOMPLETE")]
    Incomplete,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FailedRecord {
    pub name: String,
    pub status: FailureStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FailedRecord {
    pub fn error(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: FailureStatus::Error,
            error: Some(error.into()),
        }
    }

    pub fn incomplete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: FailureStatus::Incomplete,
            error: None,
        }
    }
}

/// A value that was either read from the server or is unknown because the
/// server was down. Unknown is written as the string `"Unknown"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reported<T> {
    Known(T),
    Unknown,
}

impl<T: Serialize> Serialize for Reported<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reported::Known(value) => value.serialize(serializer),
            Reported::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

// region Log reports

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct MasterLogReport {
    #[serde(rename = "Master", skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    #[serde(rename = "MasterLog", skip_serializing_if = "Option::is_none")]
    pub master_log: Option<String>,
    #[serde(rename = "LogPosition", skip_serializing_if = "Option::is_none")]
    pub log_position: Option<u64>,
    #[serde(rename = "GTIDPosition", skip_serializing_if = "Option::is_none")]
    pub gtid_position: Option<Option<String>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlaveLogRecord {
    #[serde(rename = "Slave")]
    pub slave: String,
    #[serde(rename = "MasterFile")]
    pub master_file: Reported<String>,
    #[serde(rename = "MasterPosition")]
    pub master_position: Reported<u64>,
    #[serde(rename = "RelayFile")]
    pub relay_file: Reported<String>,
    #[serde(rename = "ExecPosition")]
    pub exec_position: Reported<u64>,
    #[serde(rename = "RetrievedGTID", skip_serializing_if = "Option::is_none")]
    pub retrieved_gtid: Option<Option<String>>,
}

// endregion

// region Binlog comparison

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Warning:  Slave lagging in reading master log")]
    LaggingInRead,
    #[serde(rename = "Warning:  Slave might be lagging in execution of log")]
    LaggingInExecution,
    #[serde(rename = "DOWN")]
    Down,
}

/// `{Name, Status, Info?}` verdict shared by both binlog sub-checks.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LogVerdict<I> {
    pub name: String,
    pub status: LogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<I>,
}

impl<I> LogVerdict<I> {
    pub fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: LogStatus::Ok,
            info: None,
        }
    }

    pub fn down(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: LogStatus::Down,
            info: None,
        }
    }
}

/// Replica read position attached when it differs from the primary's.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ReadPositionInfo {
    pub log: String,
    pub position: u64,
}

/// Read vs. executed positions attached when a replica lags in execution.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExecutionInfo {
    #[serde(rename = "ReadLog")]
    pub read_log: String,
    #[serde(rename = "ReadPosition")]
    pub read_position: u64,
    #[serde(rename = "ExecLog")]
    pub exec_log: String,
    #[serde(rename = "ExecPosition")]
    pub exec_position: u64,
    #[serde(rename = "RetrievedGTID", skip_serializing_if = "Option::is_none")]
    pub retrieved_gtid: Option<Option<String>>,
    #[serde(rename = "ExecutedGTID", skip_serializing_if = "Option::is_none")]
    pub executed_gtid: Option<Option<String>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MasterPositionRecord {
    pub name: String,
    pub log: String,
    pub position: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct MasterLogComparison {
    #[serde(rename = "Master", skip_serializing_if = "Option::is_none")]
    pub master: Option<MasterPositionRecord>,
    #[serde(rename = "Slaves", skip_serializing_if = "Option::is_none")]
    pub slaves: Option<Vec<SlaveEntry<LogVerdict<ReadPositionInfo>>>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct BinlogComparison {
    #[serde(rename = "MasterLog")]
    pub master_log: MasterLogComparison,
    #[serde(rename = "SlaveLogs")]
    pub slave_logs: Vec<SlaveEntry<LogVerdict<ExecutionInfo>>>,
}

// endregion

// region Threads and errors

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Up,
    Down,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ThreadRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "IOThread")]
    pub io_thread: ThreadState,
    #[serde(rename = "SQLThread")]
    pub sql_thread: ThreadState,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Up,
    #[serde(rename = "DOWN")]
    Down,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Good,
    Bad,
    Unknown,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelReport {
    pub status: ChannelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Option<String>>,
}

impl ChannelReport {
    pub fn with_status(status: ChannelStatus) -> Self {
        Self {
            status,
            error: None,
            message: None,
            timestamp: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Connection")]
    pub connection: ConnectionState,
    #[serde(rename = "IO")]
    pub io: ChannelReport,
    #[serde(rename = "SQL")]
    pub sql: ChannelReport,
}

// endregion

// region Time lag

/// Reported lag of one replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagTime {
    Seconds(u64),
    /// The server could not compute the lag (NULL).
    Unknown,
    /// The replica is not connected.
    Down,
    /// Registered on the primary but not among the checked replicas.
    Missing,
}

impl LagTime {
    pub fn from_reading(reading: Option<u64>) -> Self {
        match reading {
            Some(seconds) => LagTime::Seconds(seconds),
            None => LagTime::Unknown,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, LagTime::Seconds(0))
    }
}

impl Serialize for LagTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LagTime::Seconds(seconds) => serializer.serialize_u64(*seconds),
            LagTime::Unknown => serializer.serialize_none(),
            LagTime::Down => serializer.serialize_str("DOWN"),
            LagTime::Missing => serializer.serialize_str("UNK"),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LagRecord {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Slave_UUID")]
    pub slave_uuid: String,
    #[serde(rename = "LagTime")]
    pub lag_time: LagTime,
}

// endregion

// region Other checks

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherStatus {
    Good,
    Bad,
    #[serde(rename = "DOWN")]
    Down,
}

/// Counter fields are present only when that counter was flagged; the inner
/// `None` is an unset counter and is written as null.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OtherRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status")]
    pub status: OtherStatus,
    #[serde(rename = "SkipCount", skip_serializing_if = "Option::is_none")]
    pub skip_count: Option<Option<u64>>,
    #[serde(rename = "TempTableCount", skip_serializing_if = "Option::is_none")]
    pub temp_table_count: Option<Option<u64>>,
    #[serde(rename = "RetryTransactionCount", skip_serializing_if = "Option::is_none")]
    pub retry_transaction_count: Option<Option<u64>>,
}

// endregion
