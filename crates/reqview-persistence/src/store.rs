//! Store contracts.
//!
//! Every backend implements the same operations with the same observable
//! results, so callers can swap one for another by changing only the handle
//! they hold. Ordering of `get_all` / `get_by_requisition` results is not
//! part of the contract; sort with [`reqview_model::sort_newest_first`] or
//! [`reqview_model::sort_by_timestamp`] for display.

use std::future::Future;

use reqview_model::{Report, ReportId, ReportPatch, Screenshot, ScreenshotId};

use crate::error::{PersistenceError, Result};

/// Durable home for reports.
pub trait ReportStore: Send + Sync {
    /// Persists a report and returns it as stored.
    ///
    /// A report whose id is not positive gets a fresh one. Saving an id that
    /// is already stored replaces that record.
    fn save(&self, report: Report) -> impl Future<Output = Result<Report>> + Send;

    /// Every stored report.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Report>>> + Send;

    /// Removes a report. Removing an absent id succeeds.
    fn delete(&self, id: ReportId) -> impl Future<Output = Result<()>> + Send;

    /// Removes every report.
    fn delete_all(&self) -> impl Future<Output = Result<()>> + Send;

    /// Applies a patch, failing with [`PersistenceError::NotFound`] when the
    /// id is absent.
    fn update(
        &self,
        id: ReportId,
        patch: ReportPatch,
    ) -> impl Future<Output = Result<Report>> + Send;

    /// Renames a report. The name is trimmed and upper-cased.
    fn rename(&self, id: ReportId, name: &str) -> impl Future<Output = Result<Report>> + Send {
        let patch = ReportPatch::rename(name).map_err(|e| PersistenceError::InvalidPatch {
            reason: e.to_string(),
        });
        async move { self.update(id, patch?).await }
    }
}

/// Durable home for screenshots. Screenshots are never updated in place.
pub trait ScreenshotStore: Send + Sync {
    /// Stores an image for a requisition and returns its new id.
    fn save(
        &self,
        requisition_id: &str,
        image: Vec<u8>,
        filename: &str,
    ) -> impl Future<Output = Result<ScreenshotId>> + Send;

    /// Every screenshot attached to `requisition_id`.
    fn get_by_requisition(
        &self,
        requisition_id: &str,
    ) -> impl Future<Output = Result<Vec<Screenshot>>> + Send;

    /// Removes a screenshot. Removing an absent id succeeds.
    fn delete(&self, id: ScreenshotId) -> impl Future<Output = Result<()>> + Send;
}

/// Checks a patch before it reaches a backend.
///
/// The name is normalized again so a hand-built patch gets the same
/// treatment as one from [`ReportPatch::rename`].
pub(crate) fn validate_patch(patch: ReportPatch) -> Result<ReportPatch> {
    match patch.name {
        None => Err(PersistenceError::InvalidPatch {
            reason: "nothing to update".to_string(),
        }),
        Some(name) => ReportPatch::rename(&name).map_err(|e| PersistenceError::InvalidPatch {
            reason: e.to_string(),
        }),
    }
}
