//! Status snapshot types supplied by a facts collector.
//!
//! These are the already-decoded status fields for one server; the checks in
//! `rep_checker` never see a database row, only these structs.

pub mod primary_status_result;
pub mod replica_status_result;

pub use primary_status_result::{LogPosition, PrimaryLogInfo, PrimaryStatus};
pub use replica_status_result::{
    ChannelError, ErrorStatus, OtherCounters, ReplicaLogInfo, ReplicaStatus, ServerVersion,
    ThreadStatus,
};
