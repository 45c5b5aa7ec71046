//! Report assembly: parse, filter, project.

use chrono::{DateTime, Utc};
use reqview_model::{ColumnSpec, Report, ReportId, STATUS_COLUMN, StatusAllowList};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::csv::{HeaderIndex, parse_csv_line};
use crate::error::{IngestError, NoMatchReason, Result};
use crate::filter::filter_rows;
use crate::projection::Projection;

/// Maximum length of a file-derived report name.
const MAX_NAME_LEN: usize = 50;

/// What to do when no row survives filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Fail with [`IngestError::NoMatchingRows`].
    #[default]
    Reject,
    /// Return a valid report with zero rows.
    AllowEmpty,
}

/// How a new report is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportNaming {
    /// Sanitized, upper-cased upload file name.
    #[default]
    FileName,
    /// `Stalled orders report – <date>`.
    StalledOrders,
}

/// Report builder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub columns: ColumnSpec,
    pub allow_list: StatusAllowList,
    pub status_column: String,
    pub empty_result: EmptyResultPolicy,
    pub naming: ReportNaming,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            columns: ColumnSpec::default(),
            allow_list: StatusAllowList::default(),
            status_column: STATUS_COLUMN.to_string(),
            empty_result: EmptyResultPolicy::default(),
            naming: ReportNaming::default(),
        }
    }
}

/// Turns CSV text into a [`Report`].
///
/// Holds no state between calls, so one builder can serve concurrent
/// uploads. Building never persists; hand the result to a report store.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    options: BuildOptions,
}

impl ReportBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Builds a report stamped with the current time.
    pub fn build(
        &self,
        csv_text: &str,
        file_name: &str,
        id_factory: impl FnOnce() -> ReportId,
    ) -> Result<Report> {
        self.build_at(csv_text, file_name, id_factory, Utc::now())
    }

    /// Builds a report with an explicit creation time.
    pub fn build_at(
        &self,
        csv_text: &str,
        file_name: &str,
        id_factory: impl FnOnce() -> ReportId,
        now: DateTime<Utc>,
    ) -> Result<Report> {
        let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text).trim();
        let mut lines = text.lines();
        let Some(header_line) = lines.next().filter(|line| !line.trim().is_empty()) else {
            return Err(IngestError::EmptyInput);
        };

        let header = parse_csv_line(header_line);
        let index = HeaderIndex::build(&header);

        let rows: Vec<_> = lines
            .filter(|line| !line.trim().is_empty())
            .map(parse_csv_line)
            .collect();
        let ragged = rows.iter().filter(|r| r.len() != index.width()).count();
        if ragged > 0 {
            warn!(
                ragged,
                expected = index.width(),
                "data rows with a field count different from the header"
            );
        }

        let options = &self.options;
        let outcome = filter_rows(rows, &index, &options.status_column, &options.allow_list);
        debug!(
            scanned = outcome.scanned,
            kept = outcome.rows.len(),
            "filtered rows by status"
        );

        if !outcome.status_column_found() && outcome.scanned > 0 {
            warn!(
                column = %options.status_column,
                rows = outcome.scanned,
                "status column not found in header; every row was dropped"
            );
        }

        if outcome.rows.is_empty() && options.empty_result == EmptyResultPolicy::Reject {
            let reason = if outcome.status_column_found() {
                NoMatchReason::NoStatusMatch {
                    scanned: outcome.scanned,
                }
            } else {
                NoMatchReason::StatusColumnMissing {
                    column: options.status_column.clone(),
                }
            };
            return Err(IngestError::NoMatchingRows { reason });
        }

        let projection = Projection::resolve(&index, &options.columns);
        let missing = projection.missing_sources(&options.columns);
        if !missing.is_empty() {
            debug!(?missing, "required columns absent from header; padding with empty values");
        }
        let data = outcome.rows.iter().map(|row| projection.apply(row)).collect();

        let name = match options.naming {
            ReportNaming::FileName => sanitize_report_name(file_name),
            ReportNaming::StalledOrders => stalled_orders_label(now),
        };

        let report = Report::new(id_factory(), name, options.columns.output_names(), data, now)?;
        debug!(
            report_id = %report.id(),
            name = %report.name(),
            records = report.record_count(),
            "built report"
        );
        Ok(report)
    }
}

/// Builds a report with the default options.
pub fn build_report(
    csv_text: &str,
    file_name: &str,
    id_factory: impl FnOnce() -> ReportId,
) -> Result<Report> {
    ReportBuilder::default().build(csv_text, file_name, id_factory)
}

/// Derives a report name from an upload file name.
///
/// Drops a `.csv` extension, replaces every character outside
/// `[A-Za-z0-9_\- ]` with `_`, upper-cases, and keeps at most 50 characters.
/// A name that ends up empty becomes `REPORT`.
pub fn sanitize_report_name(file_name: &str) -> String {
    let stem = strip_csv_extension(file_name.trim());
    let name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' ') {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    if name.trim().is_empty() {
        "REPORT".to_string()
    } else {
        name
    }
}

fn strip_csv_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(4);
    match name.get(split..) {
        Some(ext) if ext.eq_ignore_ascii_case(".csv") => &name[..split],
        _ => name,
    }
}

fn stalled_orders_label(now: DateTime<Utc>) -> String {
    format!("Stalled orders report – {}", now.format("%Y-%m-%d"))
}
