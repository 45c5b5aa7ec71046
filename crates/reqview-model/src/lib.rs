//! Shared entities for requisition review.
//!
//! Every crate in the workspace speaks in these types: the ingest pipeline
//! produces [`Report`] values, the persistence backends store them, and the
//! CLI renders them. Screenshots are attached to requisitions by value
//! (the requisition number as it appears in a report row), never by a
//! reference into a particular report.

pub mod columns;
pub mod error;
pub mod ids;
pub mod report;
pub mod screenshot;

pub use columns::{
    CORCENTRIC_ID_COLUMN, CORCENTRIC_ID_SOURCE, ColumnSpec, MORE_INFORMATION_NEEDED,
    REQUISITION_COLUMN, RequiredColumn, STATUS_COLUMN, StatusAllowList, TO_BE_APPROVED,
};
pub use error::{ModelError, Result};
pub use ids::{ReportId, ScreenshotId, TimestampIds};
pub use report::{Report, ReportPatch, sort_newest_first};
pub use screenshot::{DEFAULT_SCREENSHOT_FILENAME, Screenshot, sort_by_timestamp};
