use crate::shared::{
    ErrorStatus, OtherCounters, PrimaryLogInfo, ReplicaLogInfo, ServerVersion, ThreadStatus,
};
use async_trait::async_trait;

/// Error raised while pulling status from a server.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("server {0} is not connected")]
    Disconnected(String),
    #[error("status query failed on {server}: {message}")]
    Query { server: String, message: String },
    #[error("failed to parse facts file {path}: {message}")]
    Facts { path: String, message: String },
    #[error("failed to read facts file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Status handle for the primary.
#[async_trait]
pub trait PrimarySource: Send + Sync {
    fn name(&self) -> &str;

    async fn log_info(&self) -> Result<PrimaryLogInfo, SourceError>;

    /// Identifiers of the replicas the primary has registered (SHOW REPLICAS).
    async fn registered_replica_ids(&self) -> Result<Vec<String>, SourceError>;
}

/// Status handle for one replica.
///
/// `name`, `uuid` and `version` are known once the handle is connected and do
/// not change for the lifetime of the handle.
#[async_trait]
pub trait ReplicaSource: Send + Sync {
    fn name(&self) -> &str;

    fn uuid(&self) -> Option<String>;

    fn version(&self) -> ServerVersion;

    async fn is_connected(&self) -> bool;

    async fn log_info(&self) -> Result<ReplicaLogInfo, SourceError>;

    async fn thread_status(&self) -> Result<ThreadStatus, SourceError>;

    async fn error_status(&self) -> Result<ErrorStatus, SourceError>;

    /// Seconds behind the primary, `None` when the server cannot tell.
    async fn lag_seconds(&self) -> Result<Option<u64>, SourceError>;

    /// Re-reads the replica's lag from the server into the handle.
    async fn refresh_lag(&self) -> Result<(), SourceError>;

    async fn other_counters(&self) -> Result<OtherCounters, SourceError>;
}
