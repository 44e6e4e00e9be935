//! Replicas the primary has registered but the monitor did not check.
//!
//! Identifiers are server UUIDs on both sides: the primary's registry is
//! `SHOW REPLICAS`' `Replica_UUID` and a checked replica contributes its own
//! server UUID. A replica whose UUID is unknown to the monitor (down before it
//! was ever reached, and no `uuid` in the inventory) cannot be matched and is
//! reported missing as well.

use crate::facts_collector::ReplicaSource;
use crate::rep_checker::check_result::{LagRecord, LagTime, SlaveEntry};
use std::collections::HashSet;
use std::sync::Arc;

/// Identifiers covered by this pass. Replicas whose check failed still count
/// as checked when their handle knows its UUID.
pub fn checked_ids(
    entries: &[SlaveEntry<LagRecord>],
    replicas: &[Arc<dyn ReplicaSource>],
) -> HashSet<String> {
    entries
        .iter()
        .zip(replicas.iter())
        .filter_map(|(entry, replica)| match entry {
            SlaveEntry::Checked(record) => Some(record.slave_uuid.clone()),
            SlaveEntry::Failed(_) => replica.uuid(),
        })
        .collect()
}

/// Sentinel records for every registry identifier not in `checked`, in
/// registry order.
pub fn missing_replicas(
    registry: &[String],
    checked: &HashSet<String>,
) -> Vec<SlaveEntry<LagRecord>> {
    let mut seen = HashSet::new();
    registry
        .iter()
        .filter(|uuid| !checked.contains(*uuid) && seen.insert(uuid.as_str()))
        .map(|uuid| {
            SlaveEntry::Checked(LagRecord {
                name: None,
                slave_uuid: uuid.clone(),
                lag_time: LagTime::Missing,
            })
        })
        .collect()
}
