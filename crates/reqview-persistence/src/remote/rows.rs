//! Table row shapes.

use chrono::{DateTime, Utc};
use reqview_model::screenshot::image_data;
use reqview_model::{Report, Screenshot, ScreenshotId};
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};

/// A report as written to the reports table.
///
/// Rows are read back through [`Report`]'s own deserializer, which decodes
/// the string-encoded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: i64,
    pub name: String,
    /// JSON-encoded `Vec<String>`.
    pub headers: String,
    /// JSON-encoded `Vec<Vec<String>>`.
    pub data: String,
    pub record_count: usize,
    pub created_at: DateTime<Utc>,
}

impl ReportRow {
    pub fn from_report(report: &Report) -> Result<Self> {
        Ok(Self {
            id: report.id().get(),
            name: report.name().to_string(),
            headers: encode(report.headers())?,
            data: encode(report.data())?,
            record_count: report.record_count(),
            created_at: report.created_at(),
        })
    }
}

/// A screenshot as stored in the screenshots table, image as base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotRow {
    pub id: i64,
    pub requisition_id: String,
    pub image_data: String,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
}

impl ScreenshotRow {
    pub fn from_screenshot(shot: &Screenshot) -> Self {
        Self {
            id: shot.id.get(),
            requisition_id: shot.requisition_id.clone(),
            image_data: image_data::encode(&shot.image_data),
            filename: shot.filename.clone(),
            timestamp: shot.timestamp,
        }
    }

    pub fn into_screenshot(self) -> Result<Screenshot> {
        let bytes =
            image_data::decode(&self.image_data).map_err(|e| PersistenceError::InvalidRecord {
                reason: format!("screenshot {}: {e}", self.id),
            })?;
        Ok(Screenshot {
            id: ScreenshotId::new(self.id),
            requisition_id: self.requisition_id,
            image_data: bytes,
            filename: self.filename,
            timestamp: self.timestamp,
        })
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| PersistenceError::Serialization {
        source: Box::new(e),
    })
}
