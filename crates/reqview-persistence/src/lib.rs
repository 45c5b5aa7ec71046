//! Durable storage for reports and screenshots.
//!
//! Two contracts, [`ReportStore`] and [`ScreenshotStore`], each with
//! interchangeable backends:
//!
//! - [`JsonFileReportStore`] - one `reports.json` array, written atomically
//! - [`LocalReportStore`] - a JSON array under one key of a [`StorageArea`]
//! - [`RemoteReportStore`] / [`RemoteScreenshotStore`] - PostgREST tables
//! - [`FsScreenshotStore`] / [`MemoryScreenshotStore`]
//!
//! [`AnyReportStore`] and [`AnyScreenshotStore`] wrap the backends so a
//! caller picks one at runtime and otherwise never names it.
//!
//! Stores never cache: every read goes to the backing medium, and the
//! entities returned are copies.
//!
//! # Example
//!
//! ```ignore
//! use reqview_persistence::{JsonFileReportStore, ReportStore};
//!
//! let store = JsonFileReportStore::in_dir("data");
//! let saved = store.save(report).await?;
//! store.rename(saved.id(), "march review").await?;
//! ```

mod any;
mod collection;
mod error;
mod file;
mod io;
mod local;
mod remote;
mod screenshots;
mod store;

pub use any::{AnyReportStore, AnyScreenshotStore, Backend, LOCAL_STORAGE_FILE_NAME, open_stores};
pub use error::{PersistenceError, Result};
pub use file::{JsonFileReportStore, REPORTS_FILE_NAME};
pub use local::{DEFAULT_QUOTA_BYTES, LocalReportStore, REPORTS_KEY, StorageArea};
pub use remote::{
    DEFAULT_REPORTS_TABLE, DEFAULT_SCREENSHOTS_TABLE, RemoteClient, RemoteConfig,
    RemoteReportStore, RemoteScreenshotStore, ReportRow, ScreenshotRow,
};
pub use screenshots::{FsScreenshotStore, MemoryScreenshotStore, SCREENSHOTS_FILE_NAME};
pub use store::{ReportStore, ScreenshotStore};
