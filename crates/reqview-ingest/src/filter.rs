//! Status allow-list filtering.

use reqview_model::StatusAllowList;

use crate::csv::{HeaderIndex, RawRow};

/// Rows that survived filtering, plus enough context to explain an empty
/// result.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Surviving rows in original order.
    pub rows: Vec<RawRow>,
    /// Resolved position of the status column, `None` when the header lacks it.
    pub status_index: Option<usize>,
    /// Number of rows examined.
    pub scanned: usize,
}

impl FilterOutcome {
    pub fn status_column_found(&self) -> bool {
        self.status_index.is_some()
    }
}

/// Keeps the rows whose trimmed status is exactly on the allow-list.
///
/// If `status_column` is not in the header every row is dropped; the
/// outcome's `status_index` is then `None` so callers can tell that apart
/// from "nothing matched".
pub fn filter_rows(
    rows: Vec<RawRow>,
    index: &HeaderIndex,
    status_column: &str,
    allow: &StatusAllowList,
) -> FilterOutcome {
    let scanned = rows.len();
    let Some(status_index) = index.position(status_column) else {
        return FilterOutcome {
            rows: Vec::new(),
            status_index: None,
            scanned,
        };
    };

    let rows = rows
        .into_iter()
        .filter(|row| {
            row.get(status_index)
                .is_some_and(|status| allow.contains(status.trim()))
        })
        .collect();

    FilterOutcome {
        rows,
        status_index: Some(status_index),
        scanned,
    }
}
