// Repository trait for the remote dashboard platform
use crate::domain::dashboard::{Dashboard, DashboardSummary, Org};
use crate::domain::error::{DashboardError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the platform reports after a create/overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub uid: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub status: String,
}

/// Every write is a full-document overwrite; there is no partial update and
/// no concurrency control, so concurrent writers to one dashboard race.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn get_by_uid(&self, org: Org, uid: &str) -> Result<Dashboard>;

    /// Identifier and title of every dashboard visible to the org.
    async fn list_all(&self, org: Org) -> Result<Vec<DashboardSummary>>;

    /// `overwrite = false` only for first-time creation; the platform rejects
    /// it when the identifier already exists.
    async fn put(&self, org: Org, dashboard: &Dashboard, overwrite: bool) -> Result<SaveOutcome>;

    async fn delete(&self, org: Org, uid: &str) -> Result<()>;

    /// First dashboard whose title matches exactly. Titles are not unique.
    async fn get_by_title(&self, org: Org, title: &str) -> Result<Dashboard> {
        let summary = self
            .list_all(org)
            .await?
            .into_iter()
            .find(|d| d.title == title)
            .ok_or_else(|| DashboardError::NotFound(format!("dashboard titled {:?}", title)))?;
        self.get_by_uid(org, &summary.uid).await
    }
}
