use std::sync::Arc;

use reqview_model::{Screenshot, ScreenshotId, TimestampIds};
use reqwest::Method;

use super::rows::ScreenshotRow;
use super::{RemoteClient, RemoteConfig, check, json_body};
use crate::error::Result;
use crate::store::ScreenshotStore;

/// Screenshots in a shared remote table.
#[derive(Debug, Clone)]
pub struct RemoteScreenshotStore {
    client: RemoteClient,
    table: String,
    ids: Arc<TimestampIds>,
}

impl RemoteScreenshotStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self::with_client(
            RemoteClient::new(config)?,
            config.screenshots_table.clone(),
        ))
    }

    pub fn with_client(client: RemoteClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            ids: Arc::new(TimestampIds::new()),
        }
    }

    /// Shares an id generator with other stores.
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<TimestampIds>) -> Self {
        self.ids = ids;
        self
    }
}

impl ScreenshotStore for RemoteScreenshotStore {
    async fn save(&self, requisition_id: &str, image: Vec<u8>, filename: &str) -> Result<ScreenshotId> {
        let shot = Screenshot::new(self.ids.next_screenshot_id(), requisition_id, image, filename);
        let row = ScreenshotRow::from_screenshot(&shot);
        let url = self.client.table_url(&self.table, &[])?;
        let response = self.client.request(Method::POST, url).json(&[row]).send().await?;
        check(response).await?;
        tracing::info!(
            screenshot_id = %shot.id,
            requisition_id = %shot.requisition_id,
            bytes = shot.image_data.len(),
            "saved screenshot to remote store"
        );
        Ok(shot.id)
    }

    async fn get_by_requisition(&self, requisition_id: &str) -> Result<Vec<Screenshot>> {
        let filter = format!("eq.{requisition_id}");
        let url = self.client.table_url(
            &self.table,
            &[
                ("select", "*"),
                ("requisition_id", filter.as_str()),
                ("order", "timestamp.asc"),
            ],
        )?;
        let response = self.client.request(Method::GET, url).send().await?;
        let rows: Vec<ScreenshotRow> = json_body(check(response).await?).await?;
        let shots = rows
            .into_iter()
            .map(ScreenshotRow::into_screenshot)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(requisition_id, screenshots = shots.len(), "loaded screenshots from remote store");
        Ok(shots)
    }

    async fn delete(&self, id: ScreenshotId) -> Result<()> {
        let filter = format!("eq.{id}");
        let url = self.client.table_url(&self.table, &[("id", filter.as_str())])?;
        let response = self.client.request(Method::DELETE, url).send().await?;
        check(response).await?;
        tracing::info!(screenshot_id = %id, "deleted screenshot from remote store");
        Ok(())
    }
}
