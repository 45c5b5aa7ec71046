//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "reqview",
    version,
    about = "Stalled requisition reports from procurement CSV exports",
    long_about = "Filter procurement CSV exports down to requisitions that are waiting \
                  for approval or more information, keep the resulting reports, and \
                  attach screenshots to individual requisitions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: $REQVIEW_CONFIG, then ./reqview.json).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend (overrides the config file).
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Data directory for the file and local backends.
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Session role (overrides the config file).
    #[arg(long, value_enum, global = true)]
    pub role: Option<RoleArg>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a report from a CSV export and store it.
    Upload(UploadArgs),

    /// List stored reports, newest first.
    List,

    /// Print one report's rows.
    Show(ShowArgs),

    /// Rename a report.
    Rename(RenameArgs),

    /// Delete a report. Screenshots of its requisitions are kept.
    Delete(IdArgs),

    /// Delete every report.
    DeleteAll(DeleteAllArgs),

    /// Write a report as `<NAME>_filtered.csv`.
    Export(ExportArgs),

    /// Manage screenshots attached to requisitions.
    #[command(subcommand)]
    Screenshot(ScreenshotCommand),
}

#[derive(Args)]
pub struct UploadArgs {
    /// CSV export to ingest.
    #[arg(value_name = "CSV")]
    pub file: PathBuf,

    /// Store an empty report instead of failing when no row matches.
    #[arg(long = "allow-empty")]
    pub allow_empty: bool,

    /// How to name the report (overrides the config file).
    #[arg(long, value_enum)]
    pub naming: Option<NamingArg>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Report id.
    pub id: i64,

    /// Omit the link column.
    #[arg(long = "no-links")]
    pub no_links: bool,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Report id.
    pub id: i64,

    /// New name; trimmed and upper-cased.
    pub name: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Record id.
    pub id: i64,
}

#[derive(Args)]
pub struct DeleteAllArgs {
    /// Confirm deleting every report.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Report id.
    pub id: i64,

    /// Directory to write into (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ScreenshotCommand {
    /// Attach an image file to a requisition.
    Add(ScreenshotAddArgs),

    /// List screenshots of a requisition, oldest first.
    List(ScreenshotListArgs),

    /// Delete a screenshot.
    Delete(IdArgs),
}

#[derive(Args)]
pub struct ScreenshotAddArgs {
    /// Requisition number as shown in the report.
    pub requisition: String,

    /// Image file.
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Stored file name (default: the image's file name).
    #[arg(long)]
    pub filename: Option<String>,
}

#[derive(Args)]
pub struct ScreenshotListArgs {
    /// Requisition number as shown in the report.
    pub requisition: String,

    /// Also write each image into this directory.
    #[arg(long = "save-to", value_name = "DIR")]
    pub save_to: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    File,
    Local,
    Remote,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Viewer,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum NamingArg {
    /// Upper-cased upload file name.
    FileName,
    /// "Stalled orders report – <date>".
    StalledOrders,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
