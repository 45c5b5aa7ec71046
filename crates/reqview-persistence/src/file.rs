//! Report store backed by a single JSON file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqview_model::{Report, ReportId, ReportPatch, TimestampIds};
use tokio::sync::Mutex;

use crate::collection;
use crate::error::Result;
use crate::io::{blocking, read_json, write_json_atomic};
use crate::store::{ReportStore, validate_patch};

/// Default file name inside a data directory.
pub const REPORTS_FILE_NAME: &str = "reports.json";

/// Stores every report in one JSON array, rewritten atomically on each
/// mutation.
///
/// Mutations within one process are serialized; separate processes sharing
/// the file are last-write-wins.
#[derive(Debug)]
pub struct JsonFileReportStore {
    path: PathBuf,
    ids: Arc<TimestampIds>,
    write_lock: Mutex<()>,
}

impl JsonFileReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: Arc::new(TimestampIds::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/reports.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(REPORTS_FILE_NAME))
    }

    /// Shares an id generator with other stores.
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<TimestampIds>) -> Self {
        self.ids = ids;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Report>> {
        let path = self.path.clone();
        let reports: Vec<Report> = blocking(move || read_json(&path)).await?;
        collection::observe_ids(&reports, &self.ids);
        tracing::debug!(path = %self.path.display(), reports = reports.len(), "loaded reports");
        Ok(reports)
    }

    async fn write(&self, reports: Vec<Report>) -> Result<()> {
        let path = self.path.clone();
        blocking(move || write_json_atomic(&path, &reports)).await
    }
}

impl ReportStore for JsonFileReportStore {
    async fn save(&self, report: Report) -> Result<Report> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;
        let report = collection::assign_id(report, &self.ids);
        collection::upsert(&mut reports, report.clone());
        self.write(reports).await?;
        tracing::info!(
            report_id = %report.id(),
            name = %report.name(),
            records = report.record_count(),
            "saved report"
        );
        Ok(report)
    }

    async fn get_all(&self) -> Result<Vec<Report>> {
        self.load().await
    }

    async fn delete(&self, id: ReportId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;
        if collection::remove(&mut reports, id) {
            self.write(reports).await?;
            tracing::info!(report_id = %id, "deleted report");
        } else {
            tracing::debug!(report_id = %id, "delete of absent report ignored");
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(Vec::new()).await?;
        tracing::info!(path = %self.path.display(), "deleted all reports");
        Ok(())
    }

    async fn update(&self, id: ReportId, patch: ReportPatch) -> Result<Report> {
        let patch = validate_patch(patch)?;
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;
        let updated = collection::patch(&mut reports, id, &patch)?;
        self.write(reports).await?;
        tracing::info!(report_id = %id, name = %updated.name(), "updated report");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn report(name: &str) -> Report {
        Report::new(
            ReportId::new(0),
            name,
            vec!["Requisition #".into(), "Status".into()],
            vec![vec!["R-1".into(), "To be approved".into()]],
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_on_disk_shape() {
        let dir = tempdir().unwrap();
        let store = JsonFileReportStore::in_dir(dir.path());
        let saved = store.save(report("A")).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["id"], saved.id().get());
        assert_eq!(first["recordCount"], 1);
        assert!(first["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_fresh_ids_exceed_loaded_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(REPORTS_FILE_NAME);
        let future_id = Utc::now().timestamp_millis() + 10_000_000;
        let seeded = report("SEED").with_id(ReportId::new(future_id));
        write_json_atomic(&path, &vec![seeded]).unwrap();

        let store = JsonFileReportStore::new(&path);
        let saved = store.save(report("NEW")).await.unwrap();
        assert!(saved.id().get() > future_id);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_all_leaves_empty_array() {
        let dir = tempdir().unwrap();
        let store = JsonFileReportStore::in_dir(dir.path());
        store.save(report("A")).await.unwrap();
        store.delete_all().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.trim(), "[]");
    }
}
