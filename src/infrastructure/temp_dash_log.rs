// Durable creation log for temp dashboards
//
// Two CSV files (`identifier,timestamp`) partitioned by day-of-month parity.
// Creations append to the log of the opposite parity to today; the sweep
// compacts the log of today's parity, so the two never share a file on the
// same day. Reads and rewrites inside the process are also serialized by
// `lock`, which is never held across a remote call.
use crate::domain::error::{DashboardError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};

pub const EVEN_LOG_NAME: &str = "temp_dash_log_even.csv";
pub const ODD_LOG_NAME: &str = "temp_dash_log_odd.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPartition {
    Even,
    Odd,
}

impl LogPartition {
    pub fn for_day(day_of_month: u32) -> Self {
        if day_of_month % 2 == 0 {
            LogPartition::Even
        } else {
            LogPartition::Odd
        }
    }

    /// Log that today's creations are appended to.
    pub fn for_append(today: NaiveDate) -> Self {
        Self::for_day(today.day()).opposite()
    }

    /// Log that today's sweep compacts.
    pub fn for_sweep(today: NaiveDate) -> Self {
        Self::for_day(today.day())
    }

    pub fn opposite(self) -> Self {
        match self {
            LogPartition::Even => LogPartition::Odd,
            LogPartition::Odd => LogPartition::Even,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            LogPartition::Even => EVEN_LOG_NAME,
            LogPartition::Odd => ODD_LOG_NAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub uid: String,
    pub created_at: NaiveDateTime,
}

impl LogEntry {
    pub fn new(uid: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            uid: uid.into(),
            created_at,
        }
    }
}

#[derive(Debug)]
pub struct TempDashLog {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl TempDashLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self, partition: LogPartition) -> PathBuf {
        self.dir.join(partition.file_name())
    }

    /// Exclusive access to both log files until the guard is dropped.
    pub async fn lock(&self) -> LogGuard<'_> {
        LogGuard {
            log: self,
            _held: self.lock.lock().await,
        }
    }

    pub async fn append(&self, partition: LogPartition, entry: &LogEntry) -> Result<()> {
        self.lock().await.append(partition, entry).await
    }
}

/// File work runs on the blocking pool while the guard is held.
pub struct LogGuard<'a> {
    log: &'a TempDashLog,
    _held: MutexGuard<'a, ()>,
}

impl LogGuard<'_> {
    pub async fn append(&self, partition: LogPartition, entry: &LogEntry) -> Result<()> {
        let path = self.log.path(partition);
        let entry = entry.clone();
        blocking(move || append_entry(&path, &entry)).await
    }

    /// Every entry of the partition. A missing file is an empty log; any
    /// malformed row fails the whole read.
    pub async fn read(&self, partition: LogPartition) -> Result<Vec<LogEntry>> {
        let path = self.log.path(partition);
        blocking(move || read_entries(&path)).await
    }

    /// Replaces the partition with `entries`: written to a sibling temp file,
    /// then renamed over the live file.
    pub async fn rewrite(&self, partition: LogPartition, entries: &[LogEntry]) -> Result<()> {
        let path = self.log.path(partition);
        let entries = entries.to_vec();
        blocking(move || write_entries(&path, &entries)).await
    }
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DashboardError::Io(std::io::Error::other(e)))?
}

fn append_entry(path: &Path, entry: &LogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv_writer(file);
    write_entry(&mut writer, entry, path)?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), uid = %entry.uid, "Temp dashboard logged");
    Ok(())
}

fn read_entries(path: &Path) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| corrupt(path, e))?;

    let mut entries = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| corrupt(path, e))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() != 2 {
            return Err(corrupt(
                path,
                format!("row {} has {} fields, expected 2", line + 1, record.len()),
            ));
        }
        let created_at = parse_timestamp(&record[1]).ok_or_else(|| {
            corrupt(path, format!("row {} has bad timestamp {:?}", line + 1, &record[1]))
        })?;
        entries.push(LogEntry::new(record[0].trim(), created_at));
    }
    Ok(entries)
}

fn write_entries(path: &Path, entries: &[LogEntry]) -> Result<()> {
    let temp_path = path.with_extension("csv.tmp");

    {
        let file = std::fs::File::create(&temp_path)?;
        let mut writer = csv_writer(file);
        for entry in entries {
            write_entry(&mut writer, entry, &temp_path)?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    std::fs::rename(&temp_path, path)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "Temp dashboard log rewritten");
    Ok(())
}

fn csv_writer(file: std::fs::File) -> csv::Writer<std::fs::File> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file)
}

fn write_entry(writer: &mut csv::Writer<std::fs::File>, entry: &LogEntry, path: &Path) -> Result<()> {
    let timestamp = entry.created_at.format(TIMESTAMP_FORMAT).to_string();
    writer
        .write_record([entry.uid.as_str(), timestamp.as_str()])
        .map_err(|e| corrupt(path, e))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn corrupt(path: &Path, reason: impl ToString) -> DashboardError {
    DashboardError::corrupt(path.display().to_string(), reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_partition_selection() {
        let odd_day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(LogPartition::for_append(odd_day), LogPartition::Even);
        assert_eq!(LogPartition::for_sweep(odd_day), LogPartition::Odd);

        let even_day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(LogPartition::for_append(even_day), LogPartition::Odd);
        assert_eq!(LogPartition::for_sweep(even_day), LogPartition::Even);
        assert_eq!(LogPartition::Even.file_name(), "temp_dash_log_even.csv");
    }

    #[tokio::test]
    async fn test_append_then_read() {
        let dir = TempDir::new().unwrap();
        let log = TempDashLog::new(dir.path());

        log.append(LogPartition::Odd, &LogEntry::new("abc", at("2024-03-01 10:00:00")))
            .await
            .unwrap();
        log.append(LogPartition::Odd, &LogEntry::new("def", at("2024-03-02 11:30:00")))
            .await
            .unwrap();

        let entries = log.lock().await.read(LogPartition::Odd).await.unwrap();
        assert_eq!(
            entries,
            vec![
                LogEntry::new("abc", at("2024-03-01 10:00:00")),
                LogEntry::new("def", at("2024-03-02 11:30:00")),
            ]
        );
        assert!(log.lock().await.read(LogPartition::Even).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_existing_format_with_blank_lines() {
        let dir = TempDir::new().unwrap();
        let log = TempDashLog::new(dir.path());
        std::fs::write(
            log.path(LogPartition::Even),
            "Xy12abc,2024-03-01 10:00:00.123456\r\n\r\nQq9,2024-03-02 11:00:00\r\n",
        )
        .unwrap();

        let entries = log.lock().await.read(LogPartition::Even).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].uid, "Xy12abc");
        assert_eq!(entries[1].created_at, at("2024-03-02 11:00:00"));
    }

    #[tokio::test]
    async fn test_malformed_row_is_corruption() {
        let dir = TempDir::new().unwrap();
        let log = TempDashLog::new(dir.path());
        std::fs::write(log.path(LogPartition::Odd), "abc,yesterday\n").unwrap();

        let err = log.lock().await.read(LogPartition::Odd).await.unwrap_err();
        assert!(matches!(err, DashboardError::StateCorruption { .. }));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let log = TempDashLog::new(dir.path());
        let guard = log.lock().await;
        guard
            .append(LogPartition::Odd, &LogEntry::new("a", at("2024-03-01 10:00:00")))
            .await
            .unwrap();
        guard
            .append(LogPartition::Odd, &LogEntry::new("b", at("2024-03-02 10:00:00")))
            .await
            .unwrap();

        guard
            .rewrite(LogPartition::Odd, &[LogEntry::new("b", at("2024-03-02 10:00:00"))])
            .await
            .unwrap();

        let content = std::fs::read_to_string(log.path(LogPartition::Odd)).unwrap();
        assert_eq!(content, "b,2024-03-02 10:00:00.000000\n");
        assert!(!log.path(LogPartition::Odd).with_extension("csv.tmp").exists());
    }
}
