//! Report store over a key/value storage area.
//!
//! The storage area mirrors a browser's per-origin local storage: string
//! keys, string values, and a fixed byte quota. Reports live under one key as
//! a JSON array. An area can be purely in memory or mirrored to a JSON file
//! so it survives restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use reqview_model::{Report, ReportId, ReportPatch, TimestampIds};

use crate::collection;
use crate::error::{PersistenceError, Result};
use crate::io::{read_json, write_json_atomic};
use crate::store::{ReportStore, validate_patch};

/// Key reports are stored under.
pub const REPORTS_KEY: &str = "csvReports";

/// Default quota, matching common browser limits.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// String key/value storage with a byte quota.
#[derive(Debug, Clone)]
pub struct StorageArea {
    items: Arc<Mutex<BTreeMap<String, String>>>,
    quota: usize,
    backing_file: Option<PathBuf>,
}

impl Default for StorageArea {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StorageArea {
    pub fn in_memory() -> Self {
        Self {
            items: Arc::new(Mutex::new(BTreeMap::new())),
            quota: DEFAULT_QUOTA_BYTES,
            backing_file: None,
        }
    }

    /// Opens an area mirrored to `path`, loading any items already there.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let items: BTreeMap<String, String> = read_json(path)?;
        Ok(Self {
            items: Arc::new(Mutex::new(items)),
            quota: DEFAULT_QUOTA_BYTES,
            backing_file: Some(path.to_path_buf()),
        })
    }

    #[must_use]
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Stores a value, failing with [`PersistenceError::QuotaExceeded`] if the
    /// area would grow past its quota.
    pub fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut items = self.lock();
        let others: usize = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        let needed = others + key.len() + value.len();
        if needed > self.quota {
            return Err(PersistenceError::QuotaExceeded {
                needed,
                limit: self.quota,
            });
        }
        let mut staged = items.clone();
        staged.insert(key.to_string(), value);
        self.flush(&staged)?;
        *items = staged;
        Ok(())
    }

    /// Removes a key. The in-memory items change only once the mirror file
    /// has been written.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.lock();
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut staged = items.clone();
        staged.remove(key);
        self.flush(&staged)?;
        *items = staged;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<()> {
        match &self.backing_file {
            Some(path) => write_json_atomic(path, items),
            None => Ok(()),
        }
    }
}

/// Reports kept as one JSON array inside a [`StorageArea`].
///
/// Records written by older clients are normalized when read; the next
/// mutation writes them back in canonical shape.
#[derive(Debug)]
pub struct LocalReportStore {
    area: StorageArea,
    key: String,
    ids: Arc<TimestampIds>,
    write_lock: tokio::sync::Mutex<()>,
}

impl LocalReportStore {
    pub fn new(area: StorageArea) -> Self {
        Self {
            area,
            key: REPORTS_KEY.to_string(),
            ids: Arc::new(TimestampIds::new()),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Shares an id generator with other stores.
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<TimestampIds>) -> Self {
        self.ids = ids;
        self
    }

    pub fn area(&self) -> &StorageArea {
        &self.area
    }

    fn load(&self) -> Result<Vec<Report>> {
        let Some(text) = self.area.get_item(&self.key) else {
            return Ok(Vec::new());
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let reports: Vec<Report> =
            serde_json::from_str(&text).map_err(|e| PersistenceError::Deserialization {
                source: Box::new(e),
            })?;
        collection::observe_ids(&reports, &self.ids);
        tracing::debug!(key = %self.key, reports = reports.len(), "loaded reports");
        Ok(reports)
    }

    fn write(&self, reports: &[Report]) -> Result<()> {
        let text = serde_json::to_string(reports).map_err(|e| PersistenceError::Serialization {
            source: Box::new(e),
        })?;
        self.area.set_item(&self.key, text)
    }
}

impl ReportStore for LocalReportStore {
    async fn save(&self, report: Report) -> Result<Report> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load()?;
        let report = collection::assign_id(report, &self.ids);
        collection::upsert(&mut reports, report.clone());
        self.write(&reports)?;
        tracing::info!(
            report_id = %report.id(),
            name = %report.name(),
            records = report.record_count(),
            "saved report"
        );
        Ok(report)
    }

    async fn get_all(&self) -> Result<Vec<Report>> {
        self.load()
    }

    async fn delete(&self, id: ReportId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load()?;
        if collection::remove(&mut reports, id) {
            self.write(&reports)?;
            tracing::info!(report_id = %id, "deleted report");
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.area.remove_item(&self.key)?;
        tracing::info!(key = %self.key, "deleted all reports");
        Ok(())
    }

    async fn update(&self, id: ReportId, patch: ReportPatch) -> Result<Report> {
        let patch = validate_patch(patch)?;
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load()?;
        let updated = collection::patch(&mut reports, id, &patch)?;
        self.write(&reports)?;
        tracing::info!(report_id = %id, name = %updated.name(), "updated report");
        Ok(updated)
    }
}
