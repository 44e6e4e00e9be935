use crate::facts_collector::file_facts_collector::{FilePrimary, FileReplica};
use crate::facts_collector::status_source::{PrimarySource, ReplicaSource};
use crate::inventory::inventory_manager::InventoryManager;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Opens a status handle for every server listed in the inventory.
pub struct FactsCollector<'a, 'b> {
    inventory_manager: &'a InventoryManager<'b>,
}

impl<'a, 'b> FactsCollector<'a, 'b> {
    pub fn new(inventory_manager: &'a InventoryManager<'b>) -> Self {
        FactsCollector { inventory_manager }
    }

    pub fn collect_primary(&self) -> Result<Option<Arc<dyn PrimarySource>>> {
        let Some(master) = self.inventory_manager.get_master()? else {
            return Ok(None);
        };
        let facts_file = master.facts_file.as_deref().unwrap_or_default();
        let path = self.inventory_manager.resolve_path(facts_file);
        info!(server = %master, path = %path.display(), "Using master facts");
        Ok(Some(Arc::new(FilePrimary::new(master.name.clone(), path))))
    }

    pub async fn collect_replicas(&self) -> Result<Vec<Arc<dyn ReplicaSource>>> {
        let slaves = self.inventory_manager.get_slaves()?;
        let mut replicas: Vec<Arc<dyn ReplicaSource>> = Vec::with_capacity(slaves.len());
        for slave in slaves {
            let facts_file = slave.facts_file.as_deref().unwrap_or_default();
            let path = self.inventory_manager.resolve_path(facts_file);
            let replica = FileReplica::connect(slave.name.clone(), slave.uuid.clone(), path).await;
            replicas.push(Arc::new(replica));
        }
        info!(count = replicas.len(), "Opened slave handles");
        Ok(replicas)
    }
}
