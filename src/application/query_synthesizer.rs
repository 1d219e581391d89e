// Query synthesizer - Turns a table/column selection into a panel target
use crate::application::table_catalog::TableCatalog;
use crate::domain::dashboard::Target;
use crate::domain::error::{DashboardError, Result};
use crate::domain::templates;
use std::sync::Arc;

#[derive(Clone)]
pub struct QuerySynthesizer {
    catalog: Arc<dyn TableCatalog>,
}

impl QuerySynthesizer {
    pub fn new(catalog: Arc<dyn TableCatalog>) -> Self {
        Self { catalog }
    }

    /// Builds a raw SQL time-series target. The table's display label is
    /// resolved once and prefixes every column alias. Columns keep their
    /// input order; duplicates pass through.
    pub async fn build_target(&self, table: &str, columns: &[String]) -> Result<Target> {
        let label = self
            .catalog
            .resolve_label(table)
            .await
            .map_err(|e| match e {
                DashboardError::NotFound(_) => {
                    DashboardError::Resolution(format!("no display label for table {}", table))
                }
                other => other,
            })?;

        tracing::debug!(table, label = %label, columns = columns.len(), "Synthesizing target");

        let sql = render_sql(table, &label, columns);
        Ok(templates::sql_target(templates::ref_id(0), table, columns, sql))
    }
}

pub fn render_sql(table: &str, label: &str, columns: &[String]) -> String {
    let aliases = columns
        .iter()
        .map(|col| format!("{} AS \"{} {}\"", col, label, col))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "SELECT\n  time AS \"time\",\n  {}\nFROM {}\nWHERE $__timeFilter(time)",
        aliases, table
    )
}
