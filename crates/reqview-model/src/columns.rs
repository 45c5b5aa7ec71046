//! Projection target and status allow-list for stalled-requisition reports.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Header of the requisition number column.
pub const REQUISITION_COLUMN: &str = "Requisition #";

/// Header of the workflow status column.
pub const STATUS_COLUMN: &str = "Status";

/// Output name of the external-system id column.
pub const CORCENTRIC_ID_COLUMN: &str = "Requisition";

/// Source header the external-system id is read from.
pub const CORCENTRIC_ID_SOURCE: &str = "Requisition #(Corcentric ID)";

pub const MORE_INFORMATION_NEEDED: &str = "More information needed";
pub const TO_BE_APPROVED: &str = "To be approved";

/// One column of the report layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredColumn {
    /// Header written to the report.
    pub output: String,
    /// Header looked up in the uploaded CSV.
    pub source: String,
}

impl RequiredColumn {
    pub fn new(output: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            source: source.into(),
        }
    }

    /// A column whose output name equals its source header.
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            output: name.clone(),
            source: name,
        }
    }
}

/// Ordered projection target.
///
/// The order defines both the report headers and the column order of every
/// projected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSpec(Vec<RequiredColumn>);

impl ColumnSpec {
    pub fn new(columns: Vec<RequiredColumn>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[RequiredColumn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Report headers, in projection order.
    pub fn output_names(&self) -> Vec<String> {
        self.0.iter().map(|c| c.output.clone()).collect()
    }

    /// Position of an output column.
    pub fn output_position(&self, output: &str) -> Option<usize> {
        self.0.iter().position(|c| c.output == output)
    }
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self(vec![
            RequiredColumn::same(REQUISITION_COLUMN),
            RequiredColumn::same(STATUS_COLUMN),
            RequiredColumn::same("Net total"),
            RequiredColumn::same("Originated by"),
            RequiredColumn::same("Date of last approval"),
            RequiredColumn::same("Sent for approval date"),
            RequiredColumn::same("Last approver of the document"),
            RequiredColumn::same("Last approver to date"),
            RequiredColumn::new(CORCENTRIC_ID_COLUMN, CORCENTRIC_ID_SOURCE),
        ])
    }
}

/// Status values that qualify a row for a report.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusAllowList(BTreeSet<String>);

impl StatusAllowList {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, status: &str) -> bool {
        self.0.contains(status)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StatusAllowList {
    fn default() -> Self {
        Self::new([MORE_INFORMATION_NEEDED, TO_BE_APPROVED])
    }
}
