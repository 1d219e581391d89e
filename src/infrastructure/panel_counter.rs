// File-backed panel id counter
use crate::application::panel_ids::PanelIdAllocator;
use crate::domain::error::{DashboardError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// Next free panel id as plain text. Increments are serialized inside the
/// process and persisted with a temp-file rename; separate processes sharing
/// the file can still hand out the same id.
#[derive(Debug)]
pub struct FilePanelCounter {
    path: PathBuf,
    first_id: i64,
    lock: Mutex<()>,
}

impl FilePanelCounter {
    pub fn new(path: impl Into<PathBuf>, first_id: i64) -> Self {
        Self {
            path: path.into(),
            first_id,
            lock: Mutex::new(()),
        }
    }

    async fn read_current(&self) -> Result<i64> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(self.first_id),
            Err(e) => return Err(e.into()),
        };

        content.trim().parse::<i64>().map_err(|_| {
            DashboardError::corrupt(
                self.path.display().to_string(),
                format!("panel counter is not an integer: {:?}", content.trim()),
            )
        })
    }

    async fn store(&self, next: i64) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, next.to_string()).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PanelIdAllocator for FilePanelCounter {
    async fn next_id(&self) -> Result<i64> {
        let _held = self.lock.lock().await;
        let id = self.read_current().await?;
        self.store(id + 1).await?;
        tracing::debug!(panel_id = id, path = %self.path.display(), "Panel id allocated");
        Ok(id)
    }
}
