//! The report entity and its persisted shape.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{ModelError, ReportId};

/// Filtered and projected result of one CSV upload.
///
/// `headers` and `data` are fixed at construction; `record_count` always
/// equals `data.len()` and every row has exactly `headers.len()` fields.
/// The only permitted mutation is a rename through [`ReportPatch`].
///
/// Serialized as `{id, name, headers, data, recordCount, created_at}`.
/// Deserialization accepts older persisted shapes and normalizes them once,
/// see [`ReportRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReportRecord")]
pub struct Report {
    id: ReportId,
    name: String,
    headers: Vec<String>,
    data: Vec<Vec<String>>,
    #[serde(rename = "recordCount")]
    record_count: usize,
    created_at: DateTime<Utc>,
}

impl Report {
    /// Creates a report, rejecting rows whose width differs from the headers.
    pub fn new(
        id: ReportId,
        name: impl Into<String>,
        headers: Vec<String>,
        data: Vec<Vec<String>>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if let Some((row, fields)) = data
            .iter()
            .enumerate()
            .find(|(_, fields)| fields.len() != headers.len())
        {
            return Err(ModelError::RowWidthMismatch {
                row,
                expected: headers.len(),
                found: fields.len(),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            record_count: data.len(),
            headers,
            data,
            created_at,
        })
    }

    pub fn id(&self) -> ReportId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn data(&self) -> &[Vec<String>] {
        &self.data
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Same report under a store-assigned id.
    #[must_use]
    pub fn with_id(mut self, id: ReportId) -> Self {
        self.id = id;
        self
    }

    /// Same report with a different creation timestamp.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Position of a header.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Value of `header` in row `row`.
    pub fn value(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.column(header)?;
        self.data.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Applies a patch; fields left as `None` are untouched.
    pub fn apply(&mut self, patch: &ReportPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
    }
}

/// Sorts reports for display, most recent first.
pub fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.id.cmp(&a.id).then(b.created_at.cmp(&a.created_at)));
}

/// Partial update accepted by report stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ReportPatch {
    /// A rename. The name is trimmed and upper-cased.
    pub fn rename(name: &str) -> Result<Self, ModelError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyReportName);
        }
        Ok(Self {
            name: Some(trimmed.to_uppercase()),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// Loosely-typed persisted report.
///
/// Older writers stored ids as strings, nested sequences as JSON-encoded
/// strings, the count as `record_count`, and the label under several keys.
/// Unknown keys (including either spelling of the record count, which is
/// always recomputed) are ignored.
#[derive(Debug, Deserialize)]
struct ReportRecord {
    id: LooseId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "fileName")]
    file_name: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default, rename = "originalFileName")]
    original_file_name: Option<String>,
    headers: Nested<Vec<String>>,
    data: Nested<Vec<Vec<String>>>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default, rename = "createdAt")]
    created_at_camel: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, rename = "uploadDate")]
    upload_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Nested<T> {
    Value(T),
    Encoded(String),
}

impl<T: DeserializeOwned> Nested<T> {
    fn decode(self, field: &str) -> Result<T, ModelError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Encoded(text) => serde_json::from_str(&text)
                .map_err(|e| ModelError::InvalidRecord(format!("{field}: {e}"))),
        }
    }
}

impl TryFrom<ReportRecord> for Report {
    type Error = ModelError;

    fn try_from(record: ReportRecord) -> Result<Self, Self::Error> {
        let id = match record.id {
            LooseId::Number(n) => ReportId::new(n),
            LooseId::Text(text) => text.parse()?,
        };
        let headers = record.headers.decode("headers")?;
        let width = headers.len();
        let data = record
            .data
            .decode("data")?
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        let name = [
            record.name,
            record.file_name,
            record.filename,
            record.original_file_name,
        ]
        .into_iter()
        .flatten()
        .find(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("REPORT {id}"));

        let created_at = [
            record.created_at,
            record.created_at_camel,
            record.date,
            record.upload_date,
        ]
        .into_iter()
        .flatten()
        .find_map(|text| DateTime::parse_from_rfc3339(text.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| DateTime::from_timestamp_millis(id.get()))
        .unwrap_or_default();

        Report::new(id, name, headers, data, created_at)
    }
}
