use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use reqview_cli::config::AppConfig;
use reqview_ingest::{EmptyResultPolicy, ReportBuilder, ReportNaming, read_csv_text, write_report_csv};
use reqview_model::{Report, ReportId, Screenshot, ScreenshotId, sort_by_timestamp, sort_newest_first};
use reqview_persistence::{
    AnyReportStore, AnyScreenshotStore, ReportStore, ScreenshotStore, open_stores,
};
use tracing::info;

use crate::cli::{
    DeleteAllArgs, ExportArgs, NamingArg, RenameArgs, ScreenshotAddArgs, ScreenshotListArgs,
    UploadArgs,
};

/// Resolved config plus the stores it selects.
pub struct Session {
    pub config: AppConfig,
    pub reports: AnyReportStore,
    pub screenshots: AnyScreenshotStore,
}

impl Session {
    pub fn open(config: AppConfig) -> Result<Self> {
        let (reports, screenshots) = open_stores(config.backend, &config.data_dir, &config.remote)
            .with_context(|| format!("open {:?} store", config.backend))?;
        Ok(Self {
            config,
            reports,
            screenshots,
        })
    }
}

pub async fn run_upload(session: &Session, args: &UploadArgs) -> Result<Report> {
    session.config.role.ensure_can_modify("upload reports")?;
    let source = read_csv_text(&args.file).context("load CSV export")?;

    let mut options = session.config.build_options();
    if args.allow_empty {
        options.empty_result = EmptyResultPolicy::AllowEmpty;
    }
    if let Some(naming) = args.naming {
        options.naming = match naming {
            NamingArg::FileName => ReportNaming::FileName,
            NamingArg::StalledOrders => ReportNaming::StalledOrders,
        };
    }

    let report = ReportBuilder::new(options)
        .build(&source.text, &source.file_name, || ReportId::UNASSIGNED)
        .with_context(|| format!("build report from {}", args.file.display()))?;
    let saved = session.reports.save(report).await.context("save report")?;
    info!(
        report_id = %saved.id(),
        file = %args.file.display(),
        records = saved.record_count(),
        "uploaded report"
    );
    Ok(saved)
}

pub async fn run_list(session: &Session) -> Result<Vec<Report>> {
    let mut reports = session.reports.get_all().await.context("load reports")?;
    sort_newest_first(&mut reports);
    Ok(reports)
}

pub async fn find_report(session: &Session, id: i64) -> Result<Report> {
    let id = ReportId::new(id);
    session
        .reports
        .get_all()
        .await
        .context("load reports")?
        .into_iter()
        .find(|r| r.id() == id)
        .ok_or_else(|| anyhow!("report {id} not found"))
}

pub async fn run_rename(session: &Session, args: &RenameArgs) -> Result<Report> {
    session.config.role.ensure_can_modify("rename reports")?;
    session
        .reports
        .rename(ReportId::new(args.id), &args.name)
        .await
        .with_context(|| format!("rename report {}", args.id))
}

pub async fn run_delete(session: &Session, id: i64) -> Result<()> {
    session.config.role.ensure_can_modify("delete reports")?;
    session
        .reports
        .delete(ReportId::new(id))
        .await
        .with_context(|| format!("delete report {id}"))
}

pub async fn run_delete_all(session: &Session, args: &DeleteAllArgs) -> Result<()> {
    session.config.role.ensure_can_modify("delete reports")?;
    if !args.yes {
        bail!("refusing to delete every report without --yes");
    }
    session
        .reports
        .delete_all()
        .await
        .context("delete all reports")
}

pub async fn run_export(session: &Session, args: &ExportArgs) -> Result<PathBuf> {
    let report = find_report(session, args.id).await?;
    let dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create output directory {}", dir.display()))?;
    write_report_csv(&report, &dir).context("export report")
}

pub async fn run_screenshot_add(session: &Session, args: &ScreenshotAddArgs) -> Result<ScreenshotId> {
    session.config.role.ensure_can_modify("attach screenshots")?;
    let requisition = args.requisition.trim();
    if requisition.is_empty() {
        bail!("requisition number cannot be empty");
    }
    let image = std::fs::read(&args.image)
        .with_context(|| format!("read image {}", args.image.display()))?;
    let filename = args
        .filename
        .clone()
        .or_else(|| file_name_of(&args.image))
        .unwrap_or_default();
    session
        .screenshots
        .save(requisition, image, &filename)
        .await
        .context("save screenshot")
}

/// Screenshots of a requisition, oldest first, and the files written when a
/// directory was given.
pub async fn run_screenshot_list(
    session: &Session,
    args: &ScreenshotListArgs,
) -> Result<(Vec<Screenshot>, Vec<PathBuf>)> {
    let mut shots = session
        .screenshots
        .get_by_requisition(args.requisition.trim())
        .await
        .context("load screenshots")?;
    sort_by_timestamp(&mut shots);

    let mut written = Vec::new();
    if let Some(dir) = &args.save_to {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create directory {}", dir.display()))?;
        for shot in &shots {
            let path = dir.join(saved_image_name(shot));
            std::fs::write(&path, &shot.image_data)
                .with_context(|| format!("write image {}", path.display()))?;
            written.push(path);
        }
    }
    Ok((shots, written))
}

pub async fn run_screenshot_delete(session: &Session, id: i64) -> Result<()> {
    session.config.role.ensure_can_modify("delete screenshots")?;
    session
        .screenshots
        .delete(ScreenshotId::new(id))
        .await
        .with_context(|| format!("delete screenshot {id}"))
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// `<id>_<filename>`, with any directory part of the stored name dropped.
fn saved_image_name(shot: &Screenshot) -> String {
    let name = file_name_of(Path::new(&shot.filename)).unwrap_or_else(|| "screenshot.png".into());
    format!("{}_{}", shot.id, name)
}
