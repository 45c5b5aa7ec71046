use std::sync::Arc;

use reqview_model::{Report, ReportId, ReportPatch, TimestampIds};
use reqwest::Method;

use super::rows::ReportRow;
use super::{RemoteClient, RemoteConfig, check, json_body};
use crate::collection;
use crate::error::{PersistenceError, Result};
use crate::store::{ReportStore, validate_patch};

const RETURN_REPRESENTATION: &str = "return=representation";
/// Re-saving a stored id replaces that row.
const UPSERT: &str = "return=representation,resolution=merge-duplicates";
const CONFLICT: u16 = 409;
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Reports in a shared remote table.
#[derive(Debug, Clone)]
pub struct RemoteReportStore {
    client: RemoteClient,
    table: String,
    ids: Arc<TimestampIds>,
}

impl RemoteReportStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self::with_client(
            RemoteClient::new(config)?,
            config.reports_table.clone(),
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

    async fn post(&self, report: &Report, prefer: &str) -> Result<Report> {
        let row = ReportRow::from_report(report)?;
        let url = self.client.table_url(&self.table, &[])?;
        let response = self
            .client
            .request(Method::POST, url)
            .header("Prefer", prefer)
            .json(&[row])
            .send()
            .await?;
        let stored: Vec<Report> = json_body(check(response).await?).await?;
        Ok(stored.into_iter().next().unwrap_or_else(|| report.clone()))
    }

    /// Inserts under a fresh id. Ids come from each client's own clock, so
    /// a duplicate key is answered with 409 and retried under the next id.
    async fn insert_new(&self, report: Report) -> Result<Report> {
        let mut attempt = 1;
        loop {
            let candidate = report.clone().with_id(self.ids.next_report_id());
            match self.post(&candidate, RETURN_REPRESENTATION).await {
                Err(PersistenceError::Remote { status: CONFLICT, .. })
                    if attempt < MAX_INSERT_ATTEMPTS =>
                {
                    tracing::warn!(
                        report_id = %candidate.id(),
                        attempt,
                        "report id already taken in remote store, retrying"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl ReportStore for RemoteReportStore {
    async fn save(&self, report: Report) -> Result<Report> {
        let stored = if report.id().is_assigned() {
            self.ids.observe(report.id().get());
            self.post(&report, UPSERT).await?
        } else {
            self.insert_new(report).await?
        };

        tracing::info!(
            report_id = %stored.id(),
            name = %stored.name(),
            records = stored.record_count(),
            "saved report to remote store"
        );
        Ok(stored)
    }

    async fn get_all(&self) -> Result<Vec<Report>> {
        let url = self
            .client
            .table_url(&self.table, &[("select", "*"), ("order", "created_at.desc")])?;
        let response = self.client.request(Method::GET, url).send().await?;
        let reports: Vec<Report> = json_body(check(response).await?).await?;
        collection::observe_ids(&reports, &self.ids);
        tracing::debug!(reports = reports.len(), "loaded reports from remote store");
        Ok(reports)
    }

    async fn delete(&self, id: ReportId) -> Result<()> {
        let filter = format!("eq.{id}");
        let url = self.client.table_url(&self.table, &[("id", filter.as_str())])?;
        let response = self.client.request(Method::DELETE, url).send().await?;
        check(response).await?;
        tracing::info!(report_id = %id, "deleted report from remote store");
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        // PostgREST refuses an unfiltered DELETE.
        let url = self.client.table_url(&self.table, &[("id", "neq.0")])?;
        let response = self.client.request(Method::DELETE, url).send().await?;
        check(response).await?;
        tracing::info!(table = %self.table, "deleted all reports from remote store");
        Ok(())
    }

    async fn update(&self, id: ReportId, patch: ReportPatch) -> Result<Report> {
        let patch = validate_patch(patch)?;
        let filter = format!("eq.{id}");
        let url = self.client.table_url(&self.table, &[("id", filter.as_str())])?;
        let response = self
            .client
            .request(Method::PATCH, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch)
            .send()
            .await?;
        let updated: Vec<Report> = json_body(check(response).await?).await?;
        let updated = updated
            .into_iter()
            .next()
            .ok_or(PersistenceError::NotFound { id: id.get() })?;
        tracing::info!(report_id = %id, name = %updated.name(), "updated report in remote store");
        Ok(updated)
    }
}
