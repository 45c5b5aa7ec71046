//! Procurement CSV ingestion.
//!
//! This crate turns a raw procurement export into a [`Report`]: it tokenizes
//! each line, resolves the required columns by header name, keeps the rows
//! whose status is on the allow-list, and projects them onto the fixed report
//! layout. It never persists anything; that is the job of a report store.
//!
//! # Pipeline
//!
//! ```text
//! csv text ─► parse_csv_line ─► HeaderIndex ─► filter_rows ─► Projection ─► Report
//! ```
//!
//! # Example
//!
//! ```ignore
//! use reqview_ingest::{ReportBuilder, BuildOptions, read_csv_text};
//! use reqview_model::TimestampIds;
//!
//! let ids = TimestampIds::new();
//! let source = read_csv_text(Path::new("exports/march.csv"))?;
//! let builder = ReportBuilder::new(BuildOptions::default());
//! let report = builder.build(&source.text, &source.file_name, || ids.next_report_id())?;
//! ```
//!
//! [`Report`]: reqview_model::Report

mod builder;
mod csv;
mod error;
mod filter;
mod projection;

// === Error Types ===
pub use error::{IngestError, NoMatchReason, Result};

// === CSV Reading and Writing ===
pub use self::csv::{
    CsvSource, HeaderIndex, MAX_CSV_FILE_SIZE, RawRow, check_file_size,
    check_file_size_with_limit, export_file_name, parse_csv_line, read_csv_text,
    validate_encoding, write_report_csv, write_report_csv_to,
};

// === Filtering and Projection ===
pub use filter::{FilterOutcome, filter_rows};
pub use projection::{Projection, project_row};

// === Report Construction ===
pub use builder::{
    BuildOptions, EmptyResultPolicy, ReportBuilder, ReportNaming, build_report,
    sanitize_report_name,
};
