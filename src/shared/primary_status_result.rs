use serde::{Deserialize, Serialize};
use std::fmt;

/// A (file, offset) point in a binary log stream.
#[derive(Serialize, Deserialize, Eq, PartialEq, Hash, Clone, Debug, Default)]
pub struct LogPosition {
    pub file: String,
    pub position: u64,
}

impl LogPosition {
    pub fn new(file: impl Into<String>, position: u64) -> Self {
        Self {
            file: file.into(),
            position,
        }
    }
}

impl fmt::Display for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.position)
    }
}

/// Current binlog coordinates of the primary.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryLogInfo {
    pub position: LogPosition,
    pub gtid_mode: bool,
    pub executed_gtid: Option<String>,
}

/// Facts about the primary as exported by a collector.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(default)]
pub struct PrimaryStatus {
    pub log: LogPosition,
    pub gtid_mode: bool,
    pub executed_gtid: Option<String>,
    /// Replica identifiers the primary has registered itself (server UUIDs).
    pub replica_ids: Vec<String>,
}

impl PrimaryStatus {
    pub fn log_info(&self) -> PrimaryLogInfo {
        PrimaryLogInfo {
            position: self.log.clone(),
            gtid_mode: self.gtid_mode,
            executed_gtid: self.executed_gtid.clone(),
        }
    }
}
