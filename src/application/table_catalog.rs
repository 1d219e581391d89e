// Repository trait for the table-name lookup service
use crate::domain::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// A storage table and its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub table: String,
    pub label: String,
}

/// Lookups are substring (`LIKE '%x%'`) matches. When several rows match,
/// the first one wins; uniqueness is not checked.
#[async_trait]
pub trait TableCatalog: Send + Sync {
    /// Display label for an internal table name. `NotFound` when nothing matches.
    async fn resolve_label(&self, table: &str) -> Result<String>;

    /// Internal table name for a display label. `NotFound` when nothing matches.
    async fn resolve_table(&self, label: &str) -> Result<String>;

    /// Tables whose display label contains `filter`.
    async fn list_tables(&self, filter: &str) -> Result<Vec<TableDescriptor>>;

    /// Column names of `table`, in schema order.
    async fn list_columns(&self, table: &str) -> Result<Vec<String>>;
}
