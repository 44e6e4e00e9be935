//! In-memory status handles.
//!
//! Useful when the caller already holds decoded status (for example from its
//! own connection pool) and in tests, where the handles also count how often
//! the lag was refreshed.

use crate::facts_collector::status_source::{PrimarySource, ReplicaSource, SourceError};
use crate::shared::{
    ErrorStatus, OtherCounters, PrimaryLogInfo, PrimaryStatus, ReplicaLogInfo, ReplicaStatus,
    ServerVersion, ThreadStatus,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

pub struct StaticPrimary {
    name: String,
    status: PrimaryStatus,
}

impl StaticPrimary {
    pub fn new(name: impl Into<String>, status: PrimaryStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

#[async_trait]
impl PrimarySource for StaticPrimary {
    fn name(&self) -> &str {
        &self.name
    }

    async fn log_info(&self) -> Result<PrimaryLogInfo, SourceError> {
        Ok(self.status.log_info())
    }

    async fn registered_replica_ids(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.status.replica_ids.clone())
    }
}

pub struct StaticReplica {
    name: String,
    status: Mutex<ReplicaStatus>,
    refreshed_lag: Option<Option<u64>>,
    failure: Option<String>,
    refresh_calls: AtomicUsize,
}

impl StaticReplica {
    pub fn new(name: impl Into<String>, status: ReplicaStatus) -> Self {
        Self {
            name: name.into(),
            status: Mutex::new(status),
            refreshed_lag: None,
            failure: None,
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn disconnected(name: impl Into<String>) -> Self {
        Self::new(
            name,
            ReplicaStatus {
                connected: false,
                ..ReplicaStatus::default()
            },
        )
    }

    /// Lag the server reports after `refresh_lag` has been called.
    pub fn with_refreshed_lag(mut self, lag: Option<u64>) -> Self {
        self.refreshed_lag = Some(lag);
        self
    }

    /// Every status query fails with `message`; the handle still claims to be connected.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Result<ReplicaStatus, SourceError> {
        if let Some(message) = &self.failure {
            return Err(SourceError::Query {
                server: self.name.clone(),
                message: message.clone(),
            });
        }
        let status = self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if !status.connected {
            return Err(SourceError::Disconnected(self.name.clone()));
        }
        Ok(status)
    }
}

#[async_trait]
impl ReplicaSource for StaticReplica {
    fn name(&self) -> &str {
        &self.name
    }

    fn uuid(&self) -> Option<String> {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .uuid
            .clone()
    }

    fn version(&self) -> ServerVersion {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    async fn is_connected(&self) -> bool {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .connected
    }

    async fn log_info(&self) -> Result<ReplicaLogInfo, SourceError> {
        Ok(self.snapshot()?.log)
    }

    async fn thread_status(&self) -> Result<ThreadStatus, SourceError> {
        Ok(self.snapshot()?.threads)
    }

    async fn error_status(&self) -> Result<ErrorStatus, SourceError> {
        Ok(self.snapshot()?.errors)
    }

    async fn lag_seconds(&self) -> Result<Option<u64>, SourceError> {
        Ok(self.snapshot()?.lag_seconds)
    }

    async fn refresh_lag(&self) -> Result<(), SourceError> {
        self.snapshot()?;
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(lag) = self.refreshed_lag {
            self.status
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .lag_seconds = lag;
        }
        Ok(())
    }

    async fn other_counters(&self) -> Result<OtherCounters, SourceError> {
        Ok(self.snapshot()?.counters)
    }
}
