use crate::shared::primary_status_result::LogPosition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server version triple, written as `"major.minor.patch"` in facts files.
#[derive(Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy, Debug, Default)]
#[serde(try_from = "String", into = "String")]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ServerVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Vendor suffixes like "8.0.32-log" or "5.7.30-0ubuntu" are dropped.
        let numeric = s.split('-').next().unwrap_or_default();
        let mut parts = numeric.split('.').map(|part| part.trim().parse::<u32>());
        let mut next = |label: &str| match parts.next() {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(format!("invalid {} version in '{}': {}", label, s, e)),
            None => Ok(0),
        };
        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;
        Ok(Self::new(major, minor, patch))
    }
}

impl TryFrom<String> for ServerVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServerVersion> for String {
    fn from(value: ServerVersion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Replica's view of the primary's log: what it has read and what it has applied.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(default)]
pub struct ReplicaLogInfo {
    /// Master_Log_File / Read_Master_Log_Pos
    pub read: LogPosition,
    /// Relay_Master_Log_File / Exec_Master_Log_Pos
    pub exec: LogPosition,
    pub gtid_mode: bool,
    pub retrieved_gtid: Option<String>,
    pub executed_gtid: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Copy, Debug)]
#[serde(default)]
pub struct ThreadStatus {
    pub exists: bool,
    pub io_running: bool,
    pub sql_running: bool,
    pub replica_running: bool,
}

impl Default for ThreadStatus {
    fn default() -> Self {
        Self {
            exists: true,
            io_running: true,
            sql_running: true,
            replica_running: true,
        }
    }
}

/// Last error reported on one replication channel.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
pub struct ChannelError {
    pub code: u32,
    pub message: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(default)]
pub struct ErrorStatus {
    pub io: Option<ChannelError>,
    pub sql: Option<ChannelError>,
}

/// Auxiliary counters. `None` means the server did not report a value, which
/// is not the same as a reported zero.
#[derive(Serialize, Deserialize, PartialEq, Clone, Copy, Debug, Default)]
#[serde(default)]
pub struct OtherCounters {
    pub skip_counter: Option<u64>,
    pub temp_tables: Option<u64>,
    pub retried_transactions: Option<u64>,
}

impl OtherCounters {
    pub fn zero() -> Self {
        Self {
            skip_counter: Some(0),
            temp_tables: Some(0),
            retried_transactions: Some(0),
        }
    }
}

/// Facts about one replica as exported by a collector.
///
/// Missing fields in a facts file fall back to a connected replica with
/// running threads. A missing lag or counter reads as unset, never as zero.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct ReplicaStatus {
    pub connected: bool,
    pub uuid: Option<String>,
    pub version: ServerVersion,
    pub log: ReplicaLogInfo,
    pub threads: ThreadStatus,
    pub errors: ErrorStatus,
    pub counters: OtherCounters,
    /// Seconds_Behind_Master; `None` when the server reports NULL.
    pub lag_seconds: Option<u64>,
}

impl Default for ReplicaStatus {
    fn default() -> Self {
        Self {
            connected: true,
            uuid: None,
            version: ServerVersion::default(),
            log: ReplicaLogInfo::default(),
            threads: ThreadStatus::default(),
            errors: ErrorStatus::default(),
            counters: OtherCounters::default(),
            lag_seconds: None,
        }
    }
}

impl ReplicaStatus {
    /// A healthy replica that has read and applied everything up to
    /// `position`, with zero lag and zero counters.
    pub fn caught_up(position: LogPosition) -> Self {
        Self {
            log: ReplicaLogInfo {
                read: position.clone(),
                exec: position,
                ..ReplicaLogInfo::default()
            },
            counters: OtherCounters::zero(),
            lag_seconds: Some(0),
            ..Self::default()
        }
    }
}
