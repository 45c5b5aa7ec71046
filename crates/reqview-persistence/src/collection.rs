//! Report-list edits shared by the document-backed stores.

use reqview_model::{Report, ReportId, ReportPatch, TimestampIds};

use crate::error::{PersistenceError, Result};

/// Raises the id floor past every loaded report.
pub(crate) fn observe_ids(reports: &[Report], ids: &TimestampIds) {
    if let Some(max) = reports.iter().map(|r| r.id().get()).max() {
        ids.observe(max);
    }
}

/// Gives an unassigned report a fresh id.
pub(crate) fn assign_id(report: Report, ids: &TimestampIds) -> Report {
    if report.id().is_assigned() {
        ids.observe(report.id().get());
        report
    } else {
        report.with_id(ids.next_report_id())
    }
}

/// Inserts or replaces by id.
pub(crate) fn upsert(reports: &mut Vec<Report>, report: Report) {
    match reports.iter_mut().find(|r| r.id() == report.id()) {
        Some(existing) => *existing = report,
        None => reports.push(report),
    }
}

/// Returns whether anything was removed.
pub(crate) fn remove(reports: &mut Vec<Report>, id: ReportId) -> bool {
    let before = reports.len();
    reports.retain(|r| r.id() != id);
    reports.len() != before
}

pub(crate) fn patch(reports: &mut [Report], id: ReportId, patch: &ReportPatch) -> Result<Report> {
    let report = reports
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or(PersistenceError::NotFound { id: id.get() })?;
    report.apply(patch);
    Ok(report.clone())
}
