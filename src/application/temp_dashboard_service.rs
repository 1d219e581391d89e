// Temp dashboard lifecycle - Self-named creation and retention sweep
use crate::application::dashboard_store::DashboardStore;
use crate::domain::dashboard::Org;
use crate::domain::error::{DashboardError, Result};
use crate::domain::templates;
use crate::infrastructure::temp_dash_log::{LogEntry, LogPartition, TempDashLog};
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Title a temp dashboard carries between creation and renaming.
pub const TEMP_DASH_PLACEHOLDER_TITLE: &str = "TEMP_DASH_INITIALIZER_GET_UID_HERE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub evicted: usize,
    pub retained: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct TempDashboardService {
    store: Arc<dyn DashboardStore>,
    log: Arc<TempDashLog>,
    retention: TimeDelta,
    sweep_interval: Duration,
}

impl TempDashboardService {
    pub fn new(
        store: Arc<dyn DashboardStore>,
        log: Arc<TempDashLog>,
        retention: TimeDelta,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            store,
            log,
            retention,
            sweep_interval,
        }
    }

    /// Creates an empty temp dashboard titled with its own identifier and
    /// records it for expiry. Returns the identifier.
    ///
    /// Not transactional: a failure after the first write leaves a dashboard
    /// under the placeholder title, or one that is never logged. A leftover
    /// placeholder is picked up and finished by the next creation.
    pub async fn create_temp(&self) -> Result<String> {
        self.create_temp_at(Local::now().naive_local()).await
    }

    pub async fn create_temp_at(&self, now: NaiveDateTime) -> Result<String> {
        let placeholder = templates::new_dashboard(TEMP_DASH_PLACEHOLDER_TITLE);
        match self.store.put(Org::Temp, &placeholder, false).await {
            Ok(_) => {}
            // A placeholder left by an interrupted creation; adopt it below.
            Err(DashboardError::Conflict(reason)) => {
                tracing::warn!(reason = %reason, "Temp dashboard placeholder already exists, adopting it");
            }
            Err(e) => return Err(e),
        }

        let mut dashboard = self
            .store
            .get_by_title(Org::Temp, TEMP_DASH_PLACEHOLDER_TITLE)
            .await?;
        let uid = dashboard
            .uid
            .clone()
            .ok_or_else(|| DashboardError::Transport("created dashboard has no uid".to_string()))?;
        tracing::info!(uid = %uid, "Temp dashboard created");

        dashboard.title = uid.clone();
        self.store.put(Org::Temp, &dashboard, true).await?;
        tracing::debug!(uid = %uid, "Temp dashboard named after its uid");

        let partition = LogPartition::for_append(now.date());
        self.log.append(partition, &LogEntry::new(uid.clone(), now)).await?;
        tracing::info!(uid = %uid, log = partition.file_name(), "Temp dashboard logged for expiry");

        Ok(uid)
    }

    pub async fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(Local::now().naive_local()).await
    }

    /// Deletes every logged temp dashboard older than the retention window
    /// from today's sweep partition and compacts the log. A malformed log
    /// abandons the cycle before any delete.
    ///
    /// The log lock is held only to read and to rewrite. Deletes run
    /// unlocked, and the rewrite re-reads the partition so entries appended
    /// meanwhile survive.
    pub async fn sweep_at(&self, now: NaiveDateTime) -> Result<SweepReport> {
        let partition = LogPartition::for_sweep(now.date());
        let entries = self.log.lock().await.read(partition).await?;

        let mut report = SweepReport {
            scanned: entries.len(),
            ..SweepReport::default()
        };
        let mut evicted = Vec::new();

        for entry in entries {
            if !is_expired(entry.created_at, now, self.retention) {
                report.retained += 1;
                continue;
            }

            match self.store.delete(Org::Temp, &entry.uid).await {
                Ok(()) => {
                    tracing::info!(uid = %entry.uid, created_at = %entry.created_at, "Expired temp dashboard deleted");
                    evicted.push(entry);
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(uid = %entry.uid, "Expired temp dashboard already gone");
                    evicted.push(entry);
                }
                Err(e) => {
                    tracing::warn!(uid = %entry.uid, error = %e, "Failed to delete expired temp dashboard, keeping it for the next sweep");
                    report.failed += 1;
                    report.retained += 1;
                }
            }
        }
        report.evicted = evicted.len();

        if !evicted.is_empty() {
            let guard = self.log.lock().await;
            let kept: Vec<LogEntry> = guard
                .read(partition)
                .await?
                .into_iter()
                .filter(|entry| !evicted.contains(entry))
                .collect();
            guard.rewrite(partition, &kept).await?;
        }

        tracing::info!(
            log = partition.file_name(),
            scanned = report.scanned,
            evicted = report.evicted,
            retained = report.retained,
            failed = report.failed,
            "Temp dashboard sweep finished"
        );
        Ok(report)
    }

    /// Sweeps once per interval, starting immediately, until the process exits.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.sweep_interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep().await {
                    tracing::error!(error = %e, "Temp dashboard sweep abandoned");
                }
            }
        })
    }
}

/// Strictly older than the retention window.
pub fn is_expired(created_at: NaiveDateTime, now: NaiveDateTime, retention: TimeDelta) -> bool {
    now - created_at > retention
}
