//! Status sources for the primary and its replicas.

pub mod facts_collector;
pub mod file_facts_collector;
pub mod static_facts_collector;
pub mod status_source;

pub use status_source::{PrimarySource, ReplicaSource, SourceError};
