//! Screenshot stores kept on this machine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqview_model::{Screenshot, ScreenshotId, TimestampIds};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::io::{blocking, read_json, write_json_atomic};
use crate::store::ScreenshotStore;

/// Default file name inside a data directory.
pub const SCREENSHOTS_FILE_NAME: &str = "screenshots.json";

/// Screenshots in one JSON array file, images base64-encoded.
#[derive(Debug)]
pub struct FsScreenshotStore {
    path: PathBuf,
    ids: Arc<TimestampIds>,
    write_lock: Mutex<()>,
}

impl FsScreenshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: Arc::new(TimestampIds::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/screenshots.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SCREENSHOTS_FILE_NAME))
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

    async fn load(&self) -> Result<Vec<Screenshot>> {
        let path = self.path.clone();
        let shots: Vec<Screenshot> = blocking(move || read_json(&path)).await?;
        if let Some(max) = shots.iter().map(|s| s.id.get()).max() {
            self.ids.observe(max);
        }
        Ok(shots)
    }

    async fn write(&self, shots: Vec<Screenshot>) -> Result<()> {
        let path = self.path.clone();
        blocking(move || write_json_atomic(&path, &shots)).await
    }
}

impl ScreenshotStore for FsScreenshotStore {
    async fn save(&self, requisition_id: &str, image: Vec<u8>, filename: &str) -> Result<ScreenshotId> {
        let _guard = self.write_lock.lock().await;
        let mut shots = self.load().await?;
        let shot = Screenshot::new(self.ids.next_screenshot_id(), requisition_id, image, filename);
        let id = shot.id;
        tracing::info!(
            screenshot_id = %id,
            requisition_id = %shot.requisition_id,
            bytes = shot.image_data.len(),
            "saved screenshot"
        );
        shots.push(shot);
        self.write(shots).await?;
        Ok(id)
    }

    async fn get_by_requisition(&self, requisition_id: &str) -> Result<Vec<Screenshot>> {
        let shots = self.load().await?;
        Ok(shots
            .into_iter()
            .filter(|s| s.requisition_id == requisition_id)
            .collect())
    }

    async fn delete(&self, id: ScreenshotId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut shots = self.load().await?;
        let before = shots.len();
        shots.retain(|s| s.id != id);
        if shots.len() != before {
            self.write(shots).await?;
            tracing::info!(screenshot_id = %id, "deleted screenshot");
        }
        Ok(())
    }
}

/// Screenshots held only in memory.
#[derive(Debug, Default)]
pub struct MemoryScreenshotStore {
    shots: Mutex<Vec<Screenshot>>,
    ids: TimestampIds,
}

impl MemoryScreenshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScreenshotStore for MemoryScreenshotStore {
    async fn save(&self, requisition_id: &str, image: Vec<u8>, filename: &str) -> Result<ScreenshotId> {
        let shot = Screenshot::new(self.ids.next_screenshot_id(), requisition_id, image, filename);
        let id = shot.id;
        self.shots.lock().await.push(shot);
        Ok(id)
    }

    async fn get_by_requisition(&self, requisition_id: &str) -> Result<Vec<Screenshot>> {
        Ok(self
            .shots
            .lock()
            .await
            .iter()
            .filter(|s| s.requisition_id == requisition_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ScreenshotId) -> Result<()> {
        self.shots.lock().await.retain(|s| s.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_images_survive_reopen() {
        let dir = tempdir().unwrap();
        let store = FsScreenshotStore::in_dir(dir.path());
        let id = store.save("REQ-7", vec![1, 2, 3, 255], "").await.unwrap();

        let reopened = FsScreenshotStore::in_dir(dir.path());
        let shots = reopened.get_by_requisition("REQ-7").await.unwrap();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].id, id);
        assert_eq!(shots[0].image_data, vec![1, 2, 3, 255]);
        assert_eq!(shots[0].filename, "screenshot.png");

        let next = reopened.save("REQ-7", vec![0], "b.png").await.unwrap();
        assert!(next > id);
    }

    #[tokio::test]
    async fn test_memory_store_filters_by_requisition() {
        let store = MemoryScreenshotStore::new();
        store.save("A", vec![1], "a.png").await.unwrap();
        let b = store.save("B", vec![2], "b.png").await.unwrap();
        assert_eq!(store.get_by_requisition("A").await.unwrap().len(), 1);
        store.delete(b).await.unwrap();
        store.delete(b).await.unwrap();
        assert!(store.get_by_requisition("B").await.unwrap().is_empty());
    }
}
