// Presentation layer - JSON API over the dashboard use cases
pub mod app_state;
pub mod error;
pub mod handlers;
