// Panel copy - Moves selected temp panels onto a main-org dashboard
use crate::application::dashboard_store::{DashboardStore, SaveOutcome};
use crate::domain::dashboard::{Dashboard, Org};
use crate::domain::error::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct PanelCopyService {
    store: Arc<dyn DashboardStore>,
}

impl PanelCopyService {
    pub fn new(store: Arc<dyn DashboardStore>) -> Self {
        Self { store }
    }

    /// Appends the temp dashboard's panels listed in `panel_ids` to the main
    /// dashboard `target_uid` and overwrites it.
    pub async fn copy_panels(
        &self,
        source_uid: &str,
        target_uid: &str,
        panel_ids: &[i64],
    ) -> Result<SaveOutcome> {
        let source = self.store.get_by_uid(Org::Temp, source_uid).await?;
        let mut target = self.store.get_by_uid(Org::Main, target_uid).await?;

        let copied = append_panels(&source, &mut target, panel_ids);
        tracing::info!(
            source = source_uid,
            target = target_uid,
            requested = panel_ids.len(),
            copied,
            "Copying panels"
        );

        self.store.put(Org::Main, &target, true).await
    }
}

/// Appends copies of the source panels whose id is listed, in source order.
/// Existing target panels are never replaced and nothing is deduplicated.
pub fn append_panels(source: &Dashboard, target: &mut Dashboard, panel_ids: &[i64]) -> usize {
    let before = target.panels.len();
    for panel in &source.panels {
        for id in panel_ids {
            if panel.id == *id {
                target.panels.push(panel.clone());
            }
        }
    }
    target.panels.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::templates;
    use crate::infrastructure::memory_store::MemoryStore;

    fn dashboard(uid: &str, panel_ids: &[i64]) -> Dashboard {
        let mut dashboard = templates::new_dashboard(uid);
        dashboard.uid = Some(uid.to_string());
        for id in panel_ids {
            dashboard.panels.push(templates::line_graph(*id, &format!("panel {}", id)));
        }
        dashboard
    }

    #[tokio::test]
    async fn test_copy_selected_panels() {
        let store = Arc::new(MemoryStore::default());
        let source = dashboard("src", &[1, 3, 5, 7, 9]);
        store.insert(Org::Temp, source.clone());
        store.insert(Org::Main, dashboard("dst", &[100, 101]));

        let service = PanelCopyService::new(store.clone());
        service.copy_panels("src", "dst", &[3, 7]).await.unwrap();

        let target = store.get_by_uid(Org::Main, "dst").await.unwrap();
        assert_eq!(target.panels.len(), 4);
        assert_eq!(target.panels[0].id, 100);
        assert_eq!(target.panels[1].id, 101);
        assert_eq!(&target.panels[2], source.panel(3).unwrap());
        assert_eq!(&target.panels[3], source.panel(7).unwrap());
    }

    #[tokio::test]
    async fn test_copy_twice_duplicates() {
        let store = Arc::new(MemoryStore::default());
        store.insert(Org::Temp, dashboard("src", &[3]));
        store.insert(Org::Main, dashboard("dst", &[]));

        let service = PanelCopyService::new(store.clone());
        service.copy_panels("src", "dst", &[3]).await.unwrap();
        service.copy_panels("src", "dst", &[3]).await.unwrap();

        let target = store.get_by_uid(Org::Main, "dst").await.unwrap();
        assert_eq!(target.panels.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_dashboard_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        store.insert(Org::Temp, dashboard("src", &[3]));

        let service = PanelCopyService::new(store);
        let err = service.copy_panels("src", "nope", &[3]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_append_panels_follows_source_order() {
        let source = dashboard("src", &[1, 2, 3]);
        let mut target = dashboard("dst", &[]);

        let copied = append_panels(&source, &mut target, &[3, 1, 42]);

        assert_eq!(copied, 2);
        assert_eq!(target.panels.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);
    }
}
