pub mod server_provider;
