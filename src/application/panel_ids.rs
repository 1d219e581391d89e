// Source of panel identifiers shared by every dashboard
use crate::domain::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PanelIdAllocator: Send + Sync {
    /// Returns a fresh identifier and advances the counter.
    async fn next_id(&self) -> Result<i64>;
}
