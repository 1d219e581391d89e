// PostgreSQL implementation of the table catalog
use crate::application::table_catalog::{TableCatalog, TableDescriptor};
use crate::domain::error::{DashboardError, Result};
use async_trait::async_trait;
use sqlx::PgPool;

/// Reads the `(tabname, smaxvar)` title table: `tabname` is the storage
/// table, `smaxvar` its display label.
pub struct PgTableCatalog {
    pool: PgPool,
    titles_table: String,
}

impl PgTableCatalog {
    pub fn new(pool: PgPool, titles_table: impl Into<String>) -> Result<Self> {
        let titles_table = titles_table.into();
        if !is_identifier(&titles_table) {
            return Err(DashboardError::Validation(format!(
                "invalid titles table name: {}",
                titles_table
            )));
        }
        Ok(Self { pool, titles_table })
    }

    async fn first_match(&self, select: &str, key: &str, needle: &str) -> Result<Option<String>> {
        let sql = format!(
            "SELECT {select} FROM {table} WHERE {key} LIKE $1 ORDER BY tabname LIMIT 1",
            table = self.titles_table
        );
        let row: Option<(String,)> = sqlx::query_as(&sql)
            .bind(like_pattern(needle))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }
}

#[async_trait]
impl TableCatalog for PgTableCatalog {
    async fn resolve_label(&self, table: &str) -> Result<String> {
        self.first_match("smaxvar", "tabname", table)
            .await?
            .ok_or_else(|| DashboardError::NotFound(format!("table {}", table)))
    }

    async fn resolve_table(&self, label: &str) -> Result<String> {
        self.first_match("tabname", "smaxvar", label)
            .await?
            .ok_or_else(|| DashboardError::NotFound(format!("display label {}", label)))
    }

    async fn list_tables(&self, filter: &str) -> Result<Vec<TableDescriptor>> {
        let sql = format!(
            "SELECT tabname, smaxvar FROM {} WHERE smaxvar LIKE $1 ORDER BY tabname",
            self.titles_table
        );
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .bind(like_pattern(filter))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(filter, tables = rows.len(), "Listed tables");
        Ok(rows
            .into_iter()
            .map(|(table, label)| TableDescriptor { table, label })
            .collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_name = $1 ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(column,)| column).collect())
    }
}

fn like_pattern(needle: &str) -> String {
    format!("%{}%", needle)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}
