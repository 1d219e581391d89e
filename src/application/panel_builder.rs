// Panel builder - Creates panels and rebuilds their targets
use crate::application::panel_ids::PanelIdAllocator;
use crate::application::query_synthesizer::QuerySynthesizer;
use crate::domain::dashboard::{Dashboard, Target};
use crate::domain::error::{DashboardError, Result};
use crate::domain::selection::{TableSelection, YBounds};
use crate::domain::templates;
use std::sync::Arc;

#[derive(Clone)]
pub struct PanelBuilder {
    synthesizer: QuerySynthesizer,
    ids: Arc<dyn PanelIdAllocator>,
}

impl PanelBuilder {
    pub fn new(synthesizer: QuerySynthesizer, ids: Arc<dyn PanelIdAllocator>) -> Self {
        Self { synthesizer, ids }
    }

    /// Appends a new line-graph panel with one target per selection and
    /// returns its id. The dashboard is untouched if any target fails.
    pub async fn create_panel(
        &self,
        dashboard: &mut Dashboard,
        title: &str,
        selections: &[TableSelection],
    ) -> Result<i64> {
        if selections.is_empty() {
            return Err(DashboardError::Validation(
                "a new panel needs at least one table selection".to_string(),
            ));
        }

        let targets = self.build_targets(selections).await?;
        let id = self.allocate_id(dashboard).await?;

        let mut panel = templates::line_graph(id, title);
        panel.targets = targets;
        dashboard.panels.push(panel);

        tracing::info!(panel_id = id, title, targets = selections.len(), "Panel created");
        Ok(id)
    }

    /// Drops every target of `panel_id` and rebuilds them from `selections`,
    /// in selection order.
    pub async fn replace_targets(
        &self,
        dashboard: &mut Dashboard,
        panel_id: i64,
        selections: &[TableSelection],
    ) -> Result<()> {
        if !dashboard.has_panel(panel_id) {
            return Err(DashboardError::NotFound(format!("panel {}", panel_id)));
        }

        let targets = self.build_targets(selections).await?;
        if let Some(panel) = dashboard.panel_mut(panel_id) {
            panel.targets = targets;
        }

        tracing::info!(panel_id, targets = selections.len(), "Panel targets replaced");
        Ok(())
    }

    async fn build_targets(&self, selections: &[TableSelection]) -> Result<Vec<Target>> {
        let mut targets = Vec::with_capacity(selections.len());
        for (index, selection) in selections.iter().enumerate() {
            selection.validate()?;
            let mut target = self
                .synthesizer
                .build_target(&selection.table, &selection.columns)
                .await?;
            target.ref_id = templates::ref_id(index);
            targets.push(target);
        }
        Ok(targets)
    }

    /// Draws from the shared counter, skipping ids this dashboard already uses.
    async fn allocate_id(&self, dashboard: &Dashboard) -> Result<i64> {
        for _ in 0..=dashboard.panels.len() {
            let id = self.ids.next_id().await?;
            if !dashboard.has_panel(id) {
                return Ok(id);
            }
            tracing::warn!(panel_id = id, "Allocated panel id already in use, drawing again");
        }
        Err(DashboardError::corrupt(
            "panel id counter",
            "could not allocate an unused panel id",
        ))
    }
}

/// Sets only the bounds present in `bounds` on the first panel with `panel_id`.
pub fn update_y_bounds(dashboard: &mut Dashboard, panel_id: i64, bounds: YBounds) -> Result<()> {
    let panel = dashboard
        .panel_mut(panel_id)
        .ok_or_else(|| DashboardError::NotFound(format!("panel {}", panel_id)))?;

    let defaults = &mut panel.field_config.defaults;
    if let Some(min) = bounds.min {
        defaults.set_min(min);
    }
    if let Some(max) = bounds.max {
        defaults.set_max(max);
    }
    Ok(())
}
