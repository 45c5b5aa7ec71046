//! Runtime-selected backends.

use std::path::Path;
use std::sync::Arc;

use reqview_model::{Report, ReportId, ReportPatch, Screenshot, ScreenshotId, TimestampIds};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::file::JsonFileReportStore;
use crate::local::{LocalReportStore, StorageArea};
use crate::remote::{RemoteConfig, RemoteReportStore, RemoteScreenshotStore};
use crate::screenshots::{FsScreenshotStore, MemoryScreenshotStore};
use crate::store::{ReportStore, ScreenshotStore};

/// File the local storage area is mirrored to inside a data directory.
pub const LOCAL_STORAGE_FILE_NAME: &str = "local-storage.json";

/// Which backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// `reports.json` in the data directory.
    #[default]
    File,
    /// A key/value storage area mirrored to the data directory.
    Local,
    /// Shared remote tables.
    Remote,
}

/// Any report backend behind one handle.
#[derive(Debug)]
pub enum AnyReportStore {
    File(JsonFileReportStore),
    Local(LocalReportStore),
    Remote(RemoteReportStore),
}

/// Any screenshot backend behind one handle.
#[derive(Debug)]
pub enum AnyScreenshotStore {
    File(FsScreenshotStore),
    Memory(MemoryScreenshotStore),
    Remote(RemoteScreenshotStore),
}

/// Opens the report and screenshot stores for `backend`.
///
/// Both stores share one id generator. The local backend keeps screenshots
/// in a file next to its storage area.
pub fn open_stores(
    backend: Backend,
    data_dir: &Path,
    remote: &RemoteConfig,
) -> Result<(AnyReportStore, AnyScreenshotStore)> {
    let ids = Arc::new(TimestampIds::new());
    let stores = match backend {
        Backend::File => (
            AnyReportStore::File(JsonFileReportStore::in_dir(data_dir).with_ids(Arc::clone(&ids))),
            AnyScreenshotStore::File(FsScreenshotStore::in_dir(data_dir).with_ids(ids)),
        ),
        Backend::Local => {
            let area = StorageArea::open(data_dir.join(LOCAL_STORAGE_FILE_NAME))?;
            (
                AnyReportStore::Local(LocalReportStore::new(area).with_ids(Arc::clone(&ids))),
                AnyScreenshotStore::File(FsScreenshotStore::in_dir(data_dir).with_ids(ids)),
            )
        }
        Backend::Remote => (
            AnyReportStore::Remote(RemoteReportStore::new(remote)?.with_ids(Arc::clone(&ids))),
            AnyScreenshotStore::Remote(RemoteScreenshotStore::new(remote)?.with_ids(ids)),
        ),
    };
    tracing::debug!(?backend, data_dir = %data_dir.display(), "opened stores");
    Ok(stores)
}

impl ReportStore for AnyReportStore {
    async fn save(&self, report: Report) -> Result<Report> {
        match self {
            Self::File(store) => store.save(report).await,
            Self::Local(store) => store.save(report).await,
            Self::Remote(store) => store.save(report).await,
        }
    }

    async fn get_all(&self) -> Result<Vec<Report>> {
        match self {
            Self::File(store) => store.get_all().await,
            Self::Local(store) => store.get_all().await,
            Self::Remote(store) => store.get_all().await,
        }
    }

    async fn delete(&self, id: ReportId) -> Result<()> {
        match self {
            Self::File(store) => store.delete(id).await,
            Self::Local(store) => store.delete(id).await,
            Self::Remote(store) => store.delete(id).await,
        }
    }

    async fn delete_all(&self) -> Result<()> {
        match self {
            Self::File(store) => store.delete_all().await,
            Self::Local(store) => store.delete_all().await,
            Self::Remote(store) => store.delete_all().await,
        }
    }

    async fn update(&self, id: ReportId, patch: ReportPatch) -> Result<Report> {
        match self {
            Self::File(store) => store.update(id, patch).await,
            Self::Local(store) => store.update(id, patch).await,
            Self::Remote(store) => store.update(id, patch).await,
        }
    }
}

impl ScreenshotStore for AnyScreenshotStore {
    async fn save(&self, requisition_id: &str, image: Vec<u8>, filename: &str) -> Result<ScreenshotId> {
        match self {
            Self::File(store) => store.save(requisition_id, image, filename).await,
            Self::Memory(store) => store.save(requisition_id, image, filename).await,
            Self::Remote(store) => store.save(requisition_id, image, filename).await,
        }
    }

    async fn get_by_requisition(&self, requisition_id: &str) -> Result<Vec<Screenshot>> {
        match self {
            Self::File(store) => store.get_by_requisition(requisition_id).await,
            Self::Memory(store) => store.get_by_requisition(requisition_id).await,
            Self::Remote(store) => store.get_by_requisition(requisition_id).await,
        }
    }

    async fn delete(&self, id: ScreenshotId) -> Result<()> {
        match self {
            Self::File(store) => store.delete(id).await,
            Self::Memory(store) => store.delete(id).await,
            Self::Remote(store) => store.delete(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backend_names() {
        let parsed: Backend = serde_json::from_str("\"remote\"").unwrap();
        assert_eq!(parsed, Backend::Remote);
        assert_eq!(Backend::default(), Backend::File);
    }

    #[test]
    fn test_remote_without_url_fails_to_open() {
        let dir = tempdir().unwrap();
        let result = open_stores(Backend::Remote, dir.path(), &RemoteConfig::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_local_backend_persists_in_data_dir() {
        let dir = tempdir().unwrap();
        let (reports, _) = open_stores(Backend::Local, dir.path(), &RemoteConfig::default()).unwrap();
        let report = Report::new(ReportId::new(0), "L", vec![], vec![], chrono::Utc::now()).unwrap();
        reports.save(report).await.unwrap();
        assert!(dir.path().join(LOCAL_STORAGE_FILE_NAME).exists());

        let (reopened, _) =
            open_stores(Backend::Local, dir.path(), &RemoteConfig::default()).unwrap();
        assert_eq!(reopened.get_all().await.unwrap().len(), 1);
    }
}
