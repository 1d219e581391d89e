// Main entry point - Dependency injection, expiry sweeper and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post, put},
};
use chrono::TimeDelta;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::{DashboardService, EmbedSettings};
use crate::application::panel_builder::PanelBuilder;
use crate::application::panel_copy::PanelCopyService;
use crate::application::query_synthesizer::QuerySynthesizer;
use crate::application::temp_dashboard_service::TempDashboardService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::grafana_client::GrafanaClient;
use crate::infrastructure::panel_counter::FilePanelCounter;
use crate::infrastructure::pg_catalog::PgTableCatalog;
use crate::infrastructure::temp_dash_log::TempDashLog;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_panel, copy_panels, create_dashboard, create_temp_dashboard, delete_dashboard,
    get_dashboard, health_check, list_columns, list_dashboards, list_tables, resolve_label,
    set_time_range, set_y_bounds, update_temp_panels,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config().context("failed to load configuration")?;

    // Create adapters (infrastructure layer)
    let store = Arc::new(GrafanaClient::new(
        config.grafana.base_url.clone(),
        config.grafana.main_org_token.clone(),
        config.grafana.temp_org_token.clone(),
        Duration::from_secs(config.grafana.timeout_secs),
        config.grafana.accept_invalid_certs,
    )?);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to the title database")?;
    let catalog = Arc::new(PgTableCatalog::new(pool, config.database.titles_table.clone())?);

    let panel_ids = Arc::new(FilePanelCounter::new(
        &config.lifecycle.panel_counter_path,
        config.lifecycle.first_panel_id,
    ));
    let temp_log = Arc::new(TempDashLog::new(&config.lifecycle.log_dir));

    // Create services (application layer)
    let panels = PanelBuilder::new(QuerySynthesizer::new(catalog.clone()), panel_ids);
    let dashboard_service = DashboardService::new(
        store.clone(),
        catalog,
        panels,
        EmbedSettings {
            base_url: config.grafana.base_url.clone(),
            main_org_id: config.grafana.main_org_id,
            temp_org_id: config.grafana.temp_org_id,
        },
    );
    let temp_service = Arc::new(TempDashboardService::new(
        store.clone(),
        temp_log,
        TimeDelta::days(config.lifecycle.retention_days),
        Duration::from_secs(config.lifecycle.sweep_interval_secs),
    ));
    let copy_service = PanelCopyService::new(store);

    // Expiry sweep runs for the life of the process
    temp_service.clone().spawn_sweeper();

    let state = Arc::new(AppState {
        dashboard_service,
        temp_service,
        copy_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/tables", get(list_tables))
        .route("/tables/:table/columns", get(list_columns))
        .route("/labels/:label", get(resolve_label))
        .route("/dashboards", get(list_dashboards).post(create_dashboard))
        .route("/dashboards/:org/:uid", get(get_dashboard).delete(delete_dashboard))
        .route("/dashboards/:org/:uid/panels", post(add_panel))
        .route("/dashboards/:org/:uid/panels/:panel_id/y-bounds", put(set_y_bounds))
        .route("/dashboards/:org/:uid/time", put(set_time_range))
        .route("/temp-dashboards", post(create_temp_dashboard))
        .route("/temp-dashboards/:uid/panels", put(update_temp_panels))
        .route("/temp-dashboards/:uid/copy", post(copy_panels))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!(%addr, grafana = %config.grafana.base_url, "Starting dashforge");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
