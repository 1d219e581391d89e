// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod grafana_client;
#[cfg(test)]
pub mod memory_store;
pub mod panel_counter;
pub mod pg_catalog;
pub mod temp_dash_log;
