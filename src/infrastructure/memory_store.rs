// In-memory dashboard store for service tests
use crate::application::dashboard_store::{DashboardStore, SaveOutcome};
use crate::domain::dashboard::{Dashboard, DashboardSummary, Org};
use crate::domain::error::{DashboardError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Behaves like the platform for the calls this service makes: assigns
/// uid/id on first save, rejects non-overwrite saves that reuse a uid or a
/// title in the same org, and answers `NotFound` for unknown uids.
#[derive(Default)]
pub struct MemoryStore {
    dashboards: Mutex<Vec<(Org, Dashboard)>>,
    next_uid: AtomicUsize,
    deletes: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn insert(&self, org: Org, dashboard: Dashboard) {
        self.dashboards.lock().unwrap().push((org, dashboard));
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn get_by_uid(&self, org: Org, uid: &str) -> Result<Dashboard> {
        self.dashboards
            .lock()
            .unwrap()
            .iter()
            .find(|(o, d)| *o == org && d.uid.as_deref() == Some(uid))
            .map(|(_, d)| d.clone())
            .ok_or_else(|| DashboardError::NotFound(format!("dashboard {}", uid)))
    }

    async fn list_all(&self, org: Org) -> Result<Vec<DashboardSummary>> {
        Ok(self
            .dashboards
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == org)
            .map(|(_, d)| DashboardSummary {
                uid: d.uid.clone().unwrap_or_default(),
                title: d.title.clone(),
            })
            .collect())
    }

    async fn put(&self, org: Org, dashboard: &Dashboard, overwrite: bool) -> Result<SaveOutcome> {
        let mut dashboards = self.dashboards.lock().unwrap();
        let mut saved = dashboard.clone();

        let existing = saved.uid.as_deref().and_then(|uid| {
            dashboards
                .iter()
                .position(|(o, d)| *o == org && d.uid.as_deref() == Some(uid))
        });

        if !overwrite {
            if existing.is_some() {
                return Err(DashboardError::Conflict("dashboard uid already exists".to_string()));
            }
            if dashboards.iter().any(|(o, d)| *o == org && d.title == saved.title) {
                return Err(DashboardError::Conflict(format!(
                    "dashboard named {} already exists",
                    saved.title
                )));
            }
        }

        match existing {
            Some(index) => {
                let uid = saved.uid.clone().unwrap_or_default();
                dashboards[index].1 = saved;
                Ok(SaveOutcome { uid, version: 2, status: "success".to_string() })
            }
            None => {
                let n = self.next_uid.fetch_add(1, Ordering::SeqCst) + 1;
                let uid = saved.uid.clone().unwrap_or_else(|| format!("uid{:04}", n));
                saved.uid = Some(uid.clone());
                saved.id = Some(n as i64);
                dashboards.push((org, saved));
                Ok(SaveOutcome { uid, version: 1, status: "success".to_string() })
            }
        }
    }

    async fn delete(&self, org: Org, uid: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DashboardError::Transport("503 Service Unavailable".to_string()));
        }
        let mut dashboards = self.dashboards.lock().unwrap();
        let index = dashboards
            .iter()
            .position(|(o, d)| *o == org && d.uid.as_deref() == Some(uid))
            .ok_or_else(|| DashboardError::NotFound(format!("dashboard {}", uid)))?;
        dashboards.remove(index);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
