pub(crate) use crate::inventory::server::Server;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Replication set as described in the inventory file.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
pub struct Inventory {
    pub name: Option<String>,
    pub default_facts_dir: Option<String>,
    #[serde(default)]
    pub settings: HashMap<String, String>,
    pub master: Option<Server>,
    #[serde(default)]
    pub slaves: Vec<Server>,
}

pub struct InventoryManager<'a> {
    inventory_file_name: &'a str,
    inventory: Option<Inventory>,
}

impl<'a> InventoryManager<'a> {
    pub fn new(inventory_file_name: &'a str) -> Self {
        Self {
            inventory_file_name,
            inventory: None,
        }
    }

    pub async fn load_inventory_from_file(&mut self) -> Result<()> {
        let content = tokio::fs::read_to_string(self.inventory_file_name)
            .await
            .with_context(|| {
                format!(
                    "Failed to read inventory file: {}",
                    self.inventory_file_name
                )
            })?;

        self.load_inventory_from_str(&content)
    }

    pub fn load_inventory_from_str(&mut self, content: &str) -> Result<()> {
        let inventory: Inventory = serde_yaml::from_str(content).with_context(|| {
            format!(
                "Failed to deserialize inventory file: {}",
                self.inventory_file_name
            )
        })?;

        if inventory.master.is_none() && inventory.slaves.is_empty() {
            return Err(anyhow::anyhow!(
                "Failed to load inventory: neither master nor slaves are defined in {}",
                self.inventory_file_name
            ));
        }

        self.inventory = Some(inventory);
        Ok(())
    }

    fn get_inventory(&self) -> Result<&Inventory> {
        self.inventory
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No inventory loaded"))
    }

    fn with_defaults(inventory: &Inventory, server: &Server) -> Server {
        Server::from(server, &inventory.default_facts_dir)
    }

    pub fn get_master(&self) -> Result<Option<Server>> {
        let inventory = self.get_inventory()?;
        Ok(inventory
            .master
            .as_ref()
            .map(|server| Self::with_defaults(inventory, server)))
    }

    pub fn get_slaves(&self) -> Result<Vec<Server>> {
        let inventory = self.get_inventory()?;
        Ok(inventory
            .slaves
            .iter()
            .map(|server| Self::with_defaults(inventory, server))
            .collect())
    }

    pub fn get_settings(&self) -> Result<HashMap<String, String>> {
        Ok(self.get_inventory()?.settings.clone())
    }

    /// Resolves a path from the inventory relative to the inventory file's directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match Path::new(self.inventory_file_name).parent() {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = r#"
name: orders
default_facts_dir: facts
settings:
  confirm_delay_secs: "0"
master:
  name: db1
  uuid: 00000000-0000-0000-0000-000000000001
slaves:
  - name: db2
    uuid: 00000000-0000-0000-0000-000000000002
  - name: db3
    facts_file: /tmp/db3.yml
"#;

    #[test]
    fn test_load_inventory() {
        let mut manager = InventoryManager::new("conf/inventory.repadmin.yml");
        manager.load_inventory_from_str(INVENTORY).unwrap();

        let master = manager.get_master().unwrap().unwrap();
        assert_eq!(master.name, "db1");
        assert_eq!(master.facts_file.as_deref(), Some("facts/db1.yml"));

        let slaves = manager.get_slaves().unwrap();
        assert_eq!(slaves.len(), 2);
        assert_eq!(slaves[0].facts_file.as_deref(), Some("facts/db2.yml"));
        assert_eq!(slaves[1].uuid, None);

        assert_eq!(
            manager.get_settings().unwrap().get("confirm_delay_secs"),
            Some(&"0".to_string())
        );
        assert_eq!(
            manager.resolve_path("facts/db1.yml"),
            PathBuf::from("conf/facts/db1.yml")
        );
        assert_eq!(manager.resolve_path("/tmp/db3.yml"), PathBuf::from("/tmp/db3.yml"));
    }

    #[test]
    fn test_empty_inventory_is_rejected() {
        let mut manager = InventoryManager::new("inventory.repadmin.yml");
        let result = manager.load_inventory_from_str("name: empty\n");
        assert!(result.is_err());
        assert!(manager.get_master().is_err());
    }
}
