//! Runs the `reqview` binary against a temporary data directory.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const CSV: &str = "Requisition #,Status,Net total,Originated by,Date of last approval,\
Sent for approval date,Last approver of the document,Last approver to date,\
Requisition #(Corcentric ID)
REQ-001,To be approved,100,Alice,2024-01-02,2024-01-01,Bob,2024-01-03,9001
REQ-002,Approved,80,Carol,2024-01-04,2024-01-02,Dan,2024-01-05,9002
REQ-003,More information needed,15,Erin,2024-01-06,2024-01-03,Finn,2024-01-07,9003
";

fn reqview(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reqview"))
        .current_dir(dir)
        .env_remove("REQVIEW_CONFIG")
        .env_remove("RUST_LOG")
        .args(["--data-dir", "data", "--color", "never"])
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("march export.csv"), CSV).unwrap();
    dir
}

fn uploaded_id(output: &Output) -> String {
    stdout(output)
        .split_whitespace()
        .nth(2)
        .unwrap()
        .to_string()
}

#[test]
fn upload_list_show_export() {
    let dir = workspace();
    let upload = reqview(dir.path(), &["upload", "march export.csv"]);
    assert!(upload.status.success(), "{upload:?}");
    assert!(stdout(&upload).contains("\"MARCH EXPORT\" (2 records)"));
    let id = uploaded_id(&upload);

    let list = reqview(dir.path(), &["list"]);
    assert!(list.status.success());
    assert!(stdout(&list).contains("MARCH EXPORT"));

    let show = reqview(dir.path(), &["show", &id]);
    assert!(show.status.success());
    let shown = stdout(&show);
    assert!(shown.contains("REQ-003"));
    assert!(!shown.contains("REQ-002"));
    assert!(shown.contains("MARCH EXPORT (2 records"));

    let export = reqview(dir.path(), &["export", &id, "--output-dir", "out"]);
    assert!(export.status.success());
    let exported =
        std::fs::read_to_string(dir.path().join("out").join("MARCH EXPORT_filtered.csv")).unwrap();
    assert!(exported.starts_with("Requisition #,Status,"));
    assert_eq!(exported.lines().count(), 3);
}

#[test]
fn rename_then_delete_twice() {
    let dir = workspace();
    let upload = reqview(dir.path(), &["upload", "march export.csv"]);
    let id = uploaded_id(&upload);

    let rename = reqview(dir.path(), &["rename", &id, "q1 review"]);
    assert!(rename.status.success());
    assert!(stdout(&rename).contains("\"Q1 REVIEW\""));

    assert!(reqview(dir.path(), &["delete", &id]).status.success());
    assert!(reqview(dir.path(), &["delete", &id]).status.success());
    assert!(stdout(&reqview(dir.path(), &["list"])).contains("No reports stored."));

    let missing = reqview(dir.path(), &["rename", &id, "again"]);
    assert_eq!(missing.status.code(), Some(1));
}

#[test]
fn viewer_cannot_upload() {
    let dir = workspace();
    let output = reqview(dir.path(), &["--role", "viewer", "upload", "march export.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("viewer role cannot upload"));
}

#[test]
fn no_matching_rows_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("none.csv"),
        "Requisition #,Status\nREQ-1,Approved\n",
    )
    .unwrap();
    let output = reqview(dir.path(), &["upload", "none.csv"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no rows matched"));
    assert!(stderr.contains("--allow-empty"));

    let allowed = reqview(dir.path(), &["upload", "none.csv", "--allow-empty"]);
    assert!(allowed.status.success());
    assert!(stdout(&allowed).contains("(0 records)"));
}

#[test]
fn screenshots_attach_to_requisitions() {
    let dir = workspace();
    std::fs::write(dir.path().join("shot.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let add = reqview(dir.path(), &["screenshot", "add", "REQ-001", "shot.png"]);
    assert!(add.status.success(), "{add:?}");

    let list = reqview(
        dir.path(),
        &["screenshot", "list", "REQ-001", "--save-to", "shots"],
    );
    assert!(list.status.success());
    assert!(stdout(&list).contains("shot.png"));
    let saved: Vec<_> = std::fs::read_dir(dir.path().join("shots"))
        .unwrap()
        .collect();
    assert_eq!(saved.len(), 1);

    let other = reqview(dir.path(), &["screenshot", "list", "REQ-002"]);
    assert!(stdout(&other).contains("No screenshots for REQ-002."));
}
