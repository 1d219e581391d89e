// Dashboard service - Use cases behind the caller-facing API
use crate::application::dashboard_store::{DashboardStore, SaveOutcome};
use crate::application::panel_builder::{update_y_bounds, PanelBuilder};
use crate::application::table_catalog::{TableCatalog, TableDescriptor};
use crate::domain::dashboard::{Dashboard, DashboardSummary, Org};
use crate::domain::error::{DashboardError, Result};
use crate::domain::selection::{PanelSelection, TableSelection, YBounds};
use crate::domain::templates;
use crate::domain::time_range::normalize_range;
use serde::Serialize;
use std::sync::Arc;

/// Where single panels are embedded from.
#[derive(Debug, Clone)]
pub struct EmbedSettings {
    pub base_url: String,
    pub main_org_id: i64,
    pub temp_org_id: i64,
}

impl EmbedSettings {
    pub fn panel_url(&self, org: Org, uid: &str, panel_id: i64) -> String {
        let org_id = match org {
            Org::Temp => self.temp_org_id,
            Org::Main => self.main_org_id,
        };
        format!(
            "{}/d-solo/{}?refresh=1m&orgId={}&panelId={}",
            self.base_url.trim_end_matches('/'),
            uid,
            org_id,
            panel_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelPlacement {
    pub uid: String,
    pub panel_id: i64,
    pub embed_url: String,
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn DashboardStore>,
    catalog: Arc<dyn TableCatalog>,
    panels: PanelBuilder,
    embed: EmbedSettings,
}

impl DashboardService {
    pub fn new(
        store: Arc<dyn DashboardStore>,
        catalog: Arc<dyn TableCatalog>,
        panels: PanelBuilder,
        embed: EmbedSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            panels,
            embed,
        }
    }

    pub async fn list_tables(&self, filter: &str) -> Result<Vec<TableDescriptor>> {
        self.catalog.list_tables(filter).await
    }

    /// Internal table name behind a display label.
    pub async fn resolve_table(&self, label: &str) -> Result<TableDescriptor> {
        let table = self.catalog.resolve_table(label).await?;
        let label = self.catalog.resolve_label(&table).await?;
        Ok(TableDescriptor { table, label })
    }

    pub async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        self.catalog.list_columns(table).await
    }

    pub async fn list_dashboards(&self, org: Org) -> Result<Vec<DashboardSummary>> {
        self.store.list_all(org).await
    }

    pub async fn get_dashboard(&self, org: Org, uid: &str) -> Result<Dashboard> {
        self.store.get_by_uid(org, uid).await
    }

    /// New dashboard holding a single panel built from `selections`.
    pub async fn create_dashboard(
        &self,
        org: Org,
        dash_name: &str,
        graph_name: &str,
        selections: &[TableSelection],
    ) -> Result<SaveOutcome> {
        if dash_name.trim().is_empty() {
            return Err(DashboardError::Validation("dashboard name is empty".to_string()));
        }

        let mut dashboard = templates::new_dashboard(dash_name);
        self.panels
            .create_panel(&mut dashboard, graph_name, selections)
            .await?;

        let outcome = self.store.put(org, &dashboard, false).await?;
        tracing::info!(org = %org, uid = %outcome.uid, title = dash_name, "Dashboard created");
        Ok(outcome)
    }

    /// Adds a panel to an existing dashboard.
    pub async fn add_panel(
        &self,
        org: Org,
        uid: &str,
        graph_name: &str,
        selections: &[TableSelection],
    ) -> Result<PanelPlacement> {
        let mut dashboard = self.store.get_by_uid(org, uid).await?;
        let panel_id = self
            .panels
            .create_panel(&mut dashboard, graph_name, selections)
            .await?;
        self.store.put(org, &dashboard, true).await?;

        Ok(PanelPlacement {
            uid: uid.to_string(),
            panel_id,
            embed_url: self.embed.panel_url(org, uid, panel_id),
        })
    }

    /// Rebuilds the targets of every listed panel of a temp dashboard in one write.
    pub async fn update_panels(&self, uid: &str, updates: &[PanelSelection]) -> Result<SaveOutcome> {
        let mut dashboard = self.store.get_by_uid(Org::Temp, uid).await?;
        for update in updates {
            self.panels
                .replace_targets(&mut dashboard, update.panel_id, &update.tables)
                .await?;
        }
        self.store.put(Org::Temp, &dashboard, true).await
    }

    pub async fn set_y_bounds(
        &self,
        org: Org,
        uid: &str,
        panel_id: i64,
        bounds: YBounds,
    ) -> Result<SaveOutcome> {
        let mut dashboard = self.store.get_by_uid(org, uid).await?;
        update_y_bounds(&mut dashboard, panel_id, bounds)?;
        tracing::debug!(uid, panel_id, min = ?bounds.min, max = ?bounds.max, "Y bounds updated");
        self.store.put(org, &dashboard, true).await
    }

    /// Validates both bounds before anything is fetched; `to` defaults to `now`.
    pub async fn set_time_range(
        &self,
        org: Org,
        uid: &str,
        from: &str,
        to: Option<&str>,
    ) -> Result<SaveOutcome> {
        let range = normalize_range(from, to)?;
        let mut dashboard = self.store.get_by_uid(org, uid).await?;
        tracing::debug!(uid, from = %range.from, to = %range.to, "Time range updated");
        dashboard.time = range;
        self.store.put(org, &dashboard, true).await
    }

    pub async fn delete_dashboards(&self, org: Org, uids: &[String]) -> Result<()> {
        for uid in uids {
            self.store.delete(org, uid).await?;
            tracing::info!(org = %org, uid = %uid, "Dashboard deleted");
        }
        Ok(())
    }
}
