//! Writing reports back out as CSV.

use std::io::Write;
use std::path::{Path, PathBuf};

use reqview_model::Report;

use crate::builder::sanitize_report_name;
use crate::error::{IngestError, Result};

/// File name a report is exported under: `<NAME>_filtered.csv`.
///
/// The name is sanitized again, since renamed or legacy reports may carry
/// path separators.
pub fn export_file_name(report: &Report) -> String {
    format!("{}_filtered.csv", sanitize_report_name(report.name()))
}

/// Writes headers then data rows, quoting fields as needed.
pub fn write_report_csv_to<W: Write>(report: &Report, out: W) -> std::result::Result<(), ::csv::Error> {
    let mut writer = ::csv::Writer::from_writer(out);
    writer.write_record(report.headers())?;
    for row in report.data() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the report into `dir` and returns the created path.
pub fn write_report_csv(report: &Report, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(export_file_name(report));
    let file = std::fs::File::create(&path).map_err(|e| IngestError::FileWrite {
        path: path.clone(),
        source: e,
    })?;
    write_report_csv_to(report, file).map_err(|e| IngestError::CsvWrite {
        path: path.clone(),
        source: e,
    })?;
    tracing::info!(
        report_id = %report.id(),
        path = %path.display(),
        rows = report.record_count(),
        "exported report"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reqview_model::ReportId;

    fn report() -> Report {
        named("MARCH")
    }

    fn named(name: &str) -> Report {
        Report::new(
            ReportId::new(9),
            name,
            vec!["Requisition #".into(), "Net total".into()],
            vec![vec!["R-1".into(), "1,200.00".into()]],
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_export_quotes_embedded_commas() {
        let mut buf = Vec::new();
        write_report_csv_to(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Requisition #,Net total\nR-1,\"1,200.00\"\n");
    }

    #[test]
    fn test_write_report_csv_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report_csv(&report(), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "MARCH_filtered.csv");
        assert!(path.exists());
    }

    #[test]
    fn test_export_stays_inside_target_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let path = write_report_csv(&named("../ESCAPED"), &out).unwrap();
        assert_eq!(path.parent().unwrap(), out);
        assert_eq!(path.file_name().unwrap(), "___ESCAPED_filtered.csv");
        assert!(!dir.path().join("ESCAPED_filtered.csv").exists());

        let nested = write_report_csv(&named("Q1/Q2"), &out).unwrap();
        assert_eq!(nested.file_name().unwrap(), "Q1_Q2_filtered.csv");
        assert!(nested.exists());
    }
}
