// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::panel_copy::PanelCopyService;
use crate::application::temp_dashboard_service::TempDashboardService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub temp_service: Arc<TempDashboardService>,
    pub copy_service: PanelCopyService,
}
