use crate::facts_collector::status_source::{PrimarySource, ReplicaSource, SourceError};
use crate::shared::{
    ErrorStatus, OtherCounters, PrimaryLogInfo, PrimaryStatus, ReplicaLogInfo, ReplicaStatus,
    ServerVersion, ThreadStatus,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

async fn read_facts<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
    serde_yaml::from_str(&content).map_err(|e| SourceError::Facts {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Primary whose status is exported to a YAML facts file.
///
/// The file is read on every query so that an exporter can keep it current.
pub struct FilePrimary {
    name: String,
    path: PathBuf,
}

impl FilePrimary {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    async fn status(&self) -> Result<PrimaryStatus, SourceError> {
        read_facts(&self.path).await
    }
}

#[async_trait]
impl PrimarySource for FilePrimary {
    fn name(&self) -> &str {
        &self.name
    }

    async fn log_info(&self) -> Result<PrimaryLogInfo, SourceError> {
        Ok(self.status().await?.log_info())
    }

    async fn registered_replica_ids(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.status().await?.replica_ids)
    }
}

/// Replica whose status is exported to a YAML facts file.
///
/// The file is read once on connect; `refresh_lag` re-reads it and updates
/// only the cached lag. A file that cannot be read on connect leaves the
/// handle disconnected.
pub struct FileReplica {
    name: String,
    path: PathBuf,
    uuid: Option<String>,
    version: ServerVersion,
    status: Mutex<Option<ReplicaStatus>>,
}

impl FileReplica {
    pub async fn connect(name: impl Into<String>, uuid: Option<String>, path: PathBuf) -> Self {
        let name = name.into();
        let status = match read_facts::<ReplicaStatus>(&path).await {
            Ok(status) => {
                debug!(server = %name, path = %path.display(), "Loaded replica facts");
                Some(status)
            }
            Err(e) => {
                warn!(server = %name, error = %e, "Replica facts unavailable, marking server down");
                None
            }
        };
        let uuid = status
            .as_ref()
            .and_then(|status| status.uuid.clone())
            .or(uuid);
        let version = status
            .as_ref()
            .map(|status| status.version)
            .unwrap_or_default();
        Self {
            name,
            path,
            uuid,
            version,
            status: Mutex::new(status),
        }
    }

    fn snapshot(&self) -> Result<ReplicaStatus, SourceError> {
        let status = self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match status {
            Some(status) if status.connected => Ok(status),
            _ => Err(SourceError::Disconnected(self.name.clone())),
        }
    }
}

#[async_trait]
impl ReplicaSource for FileReplica {
    fn name(&self) -> &str {
        &self.name
    }

    fn uuid(&self) -> Option<String> {
        self.uuid.clone()
    }

    fn version(&self) -> ServerVersion {
        self.version
    }

    async fn is_connected(&self) -> bool {
        self.snapshot().is_ok()
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
        let fresh: ReplicaStatus = read_facts(&self.path).await?;
        let mut cached = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = cached.as_mut() {
            status.lag_seconds = fresh.lag_seconds;
        }
        Ok(())
    }

    async fn other_counters(&self) -> Result<OtherCounters, SourceError> {
        Ok(self.snapshot()?.counters)
    }
}
