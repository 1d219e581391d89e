// HTTP request handlers
use crate::application::dashboard_service::PanelPlacement;
use crate::application::dashboard_store::SaveOutcome;
use crate::application::table_catalog::TableDescriptor;
use crate::domain::dashboard::{Dashboard, DashboardSummary, Org};
use crate::domain::error::DashboardError;
use crate::domain::selection::{PanelSelection, TableSelection, YBounds};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Deserialize)]
pub struct TableFilter {
    #[serde(default)]
    pub filter: String,
}

#[derive(Deserialize)]
pub struct CreateDashboardRequest {
    pub dash_name: String,
    pub graph_name: String,
    pub selections: Vec<TableSelection>,
    #[serde(default)]
    pub org: Option<Org>,
}

#[derive(Deserialize)]
pub struct AddPanelRequest {
    pub graph_name: String,
    pub selections: Vec<TableSelection>,
}

#[derive(Deserialize)]
pub struct UpdatePanelsRequest {
    pub panels: Vec<PanelSelection>,
}

/// Bounds arrive as form text or JSON numbers; blank or null means unchanged.
#[derive(Deserialize)]
pub struct YBoundsRequest {
    #[serde(default)]
    pub min: Value,
    #[serde(default)]
    pub max: Value,
}

#[derive(Deserialize)]
pub struct TimeRangeRequest {
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct CopyPanelsRequest {
    pub target_uid: String,
    pub panel_ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct CreatedTemp {
    pub uid: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_tables(
    Query(query): Query<TableFilter>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<TableDescriptor>> {
    Ok(Json(state.dashboard_service.list_tables(&query.filter).await?))
}

pub async fn resolve_label(
    Path(label): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<TableDescriptor> {
    Ok(Json(state.dashboard_service.resolve_table(&label).await?))
}

pub async fn list_columns(
    Path(table): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<String>> {
    Ok(Json(state.dashboard_service.list_columns(&table).await?))
}

/// Dashboards of the main org, the targets for panel copies
pub async fn list_dashboards(State(state): State<Arc<AppState>>) -> ApiResult<Vec<DashboardSummary>> {
    Ok(Json(state.dashboard_service.list_dashboards(Org::Main).await?))
}

pub async fn create_dashboard(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDashboardRequest>,
) -> Result<(StatusCode, Json<SaveOutcome>), ApiError> {
    let outcome = state
        .dashboard_service
        .create_dashboard(
            request.org.unwrap_or(Org::Main),
            &request.dash_name,
            &request.graph_name,
            &request.selections,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn get_dashboard(
    Path((org, uid)): Path<(Org, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Dashboard> {
    Ok(Json(state.dashboard_service.get_dashboard(org, &uid).await?))
}

pub async fn delete_dashboard(
    Path((org, uid)): Path<(Org, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state
        .dashboard_service
        .delete_dashboards(org, &[uid])
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_temp_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CreatedTemp>), ApiError> {
    let uid = state.temp_service.create_temp().await?;
    Ok((StatusCode::CREATED, Json(CreatedTemp { uid })))
}

pub async fn add_panel(
    Path((org, uid)): Path<(Org, String)>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddPanelRequest>,
) -> ApiResult<PanelPlacement> {
    let placement = state
        .dashboard_service
        .add_panel(org, &uid, &request.graph_name, &request.selections)
        .await?;
    Ok(Json(placement))
}

pub async fn update_temp_panels(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdatePanelsRequest>,
) -> ApiResult<SaveOutcome> {
    Ok(Json(
        state
            .dashboard_service
            .update_panels(&uid, &request.panels)
            .await?,
    ))
}

pub async fn set_y_bounds(
    Path((org, uid, panel_id)): Path<(Org, String, i64)>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<YBoundsRequest>,
) -> ApiResult<SaveOutcome> {
    let min = bound_text(&request.min)?;
    let max = bound_text(&request.max)?;
    let bounds = YBounds::parse(min.as_deref(), max.as_deref())?;
    Ok(Json(
        state
            .dashboard_service
            .set_y_bounds(org, &uid, panel_id, bounds)
            .await?,
    ))
}

pub async fn set_time_range(
    Path((org, uid)): Path<(Org, String)>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<TimeRangeRequest>,
) -> ApiResult<SaveOutcome> {
    Ok(Json(
        state
            .dashboard_service
            .set_time_range(org, &uid, &request.from, request.to.as_deref())
            .await?,
    ))
}

pub async fn copy_panels(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CopyPanelsRequest>,
) -> ApiResult<SaveOutcome> {
    Ok(Json(
        state
            .copy_service
            .copy_panels(&uid, &request.target_uid, &request.panel_ids)
            .await?,
    ))
}

fn bound_text(value: &Value) -> Result<Option<String>, DashboardError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(DashboardError::Validation(format!(
            "y bound must be a number, got {}",
            other
        ))),
    }
}
