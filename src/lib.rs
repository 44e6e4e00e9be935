//! Replication status checker for a MySQL primary and its replicas.
//!
//! The library side holds the checks ([`rep_checker`]), the dispatcher that
//! assembles them into a [`dispatcher::Report`], and the inventory and facts
//! collectors the `repadmin` binary feeds them from.

pub mod clap_parser;
pub mod dispatcher;
pub mod facts_collector;
pub mod inventory;
pub mod rep_checker;
pub mod report_writer;
pub mod server_provider;
pub mod settings_provider;
pub mod shared;
