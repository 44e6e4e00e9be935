//! Inventory management module for the monitored replication set
//!
//! Loads the master and slave definitions together with the settings map
//! from a YAML inventory file.

pub mod inventory_manager;
pub mod server;
