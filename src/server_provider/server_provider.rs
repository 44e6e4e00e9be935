use crate::facts_collector::facts_collector::FactsCollector;
use crate::inventory::inventory_manager::InventoryManager;
use crate::rep_checker::Topology;
use crate::settings_provider::settings_provider::SettingsProvider;
use anyhow::Result;
use tracing::info;

/// Loads the inventory and turns it into the topology one run checks.
pub struct ServerProvider<'a> {
    inventory_manager: InventoryManager<'a>,
    settings_provider: SettingsProvider,
}

impl<'a> ServerProvider<'a> {
    pub async fn new(inventory_file_name: &'a str) -> Result<Self> {
        let mut inventory_manager = InventoryManager::new(inventory_file_name);
        inventory_manager.load_inventory_from_file().await?;
        let settings_provider = SettingsProvider::new(inventory_manager.get_settings()?);
        info!(inventory = %inventory_file_name, "Loaded inventory");
        Ok(Self {
            inventory_manager,
            settings_provider,
        })
    }

    pub fn settings_provider(&mut self) -> &mut SettingsProvider {
        &mut self.settings_provider
    }

    pub async fn build_topology(&self) -> Result<Topology> {
        let options = self.settings_provider.check_options()?;
        let facts_collector = FactsCollector::new(&self.inventory_manager);
        let primary = facts_collector.collect_primary()?;
        let replicas = facts_collector.collect_replicas().await?;
        Ok(Topology::new(primary, replicas, options))
    }
}
