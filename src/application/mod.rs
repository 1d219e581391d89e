// Application layer - Use cases and the traits infrastructure implements
pub mod dashboard_service;
pub mod dashboard_store;
pub mod panel_builder;
pub mod panel_copy;
pub mod panel_ids;
pub mod query_synthesizer;
pub mod table_catalog;
pub mod temp_dashboard_service;
