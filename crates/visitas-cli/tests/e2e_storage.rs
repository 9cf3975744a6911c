//! E2E tests for persistence edges: export/import, browser dumps, and an
//! unreachable store.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const ADMIN: &str = "ana@example.com";

fn vt(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vt"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env("HOME", dir);
    cmd.env_remove("FORMAT");
    cmd.env("VISITAS_USER", ADMIN);
    cmd.env("VISITAS_LOG", "error");
    cmd
}

fn init_project(dir: &Path) {
    vt(dir).args(["init", "--admin", ADMIN]).assert().success();
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().expect("vt should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn export_then_import_into_fresh_project() {
    let source = TempDir::new().unwrap();
    init_project(source.path());
    for street in ["Rua A", "Rua B"] {
        vt(source.path())
            .args(["add", "--address", street, "--territory", "T1"])
            .assert()
            .success();
    }
    let backup = source.path().join("backup.json");
    vt(source.path())
        .args(["export", "--output"])
        .arg(&backup)
        .assert()
        .success();

    let target = TempDir::new().unwrap();
    init_project(target.path());
    let report = stdout_json(vt(target.path()).args(["import", "--input"]).arg(&backup));
    assert_eq!(report["imported"], 2);

    let exported: Value = serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
    let list = stdout_json(vt(target.path()).args(["list"]));
    assert_eq!(list["addresses"], exported);

    // A second import collides on every id and changes nothing.
    let output = vt(target.path())
        .args(["import", "--json", "--input"])
        .arg(&backup)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["error_code"], "E2006");
    assert_eq!(stdout_json(vt(target.path()).args(["list"]))["total"], 2);
}

#[test]
fn export_to_stdout_is_json_in_every_mode() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    vt(dir.path())
        .args(["add", "--address", "Rua A", "--territory", "T1"])
        .assert()
        .success();

    let output = vt(dir.path())
        .args(["--format", "pretty", "export"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
}

#[test]
fn import_accepts_browser_dump_with_blank_fields() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let dump = dir.path().join("addresses.json");
    std::fs::write(
        &dump,
        r#"[
          {"id": 1718000000000, "address": "Rua das Flores, 12", "territory": "T1",
           "status": "falta_pregar", "contact_name": "", "phone": "", "observations": "",
           "best_time": "", "last_visit_date": "", "visit_count": 0,
           "assigned_to_email": "ana@example.com"}
        ]"#,
    )
    .unwrap();

    vt(dir.path())
        .args(["import", "--input"])
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 addresses"));

    let show = stdout_json(vt(dir.path()).args(["show", "1718000000000"]));
    assert!(show["phone"].is_null());
    assert!(show["last_visit_date"].is_null());
    assert_eq!(show["mark_done_enabled"], true);
}

#[test]
fn unreadable_store_degrades_reads_but_fails_writes() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let blob = dir.path().join(".visitas/store/addresses.json");
    std::fs::remove_file(&blob).unwrap();
    std::fs::create_dir(&blob).unwrap();

    let output = vt(dir.path()).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let list: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(list["total"], 0);
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty session"));

    vt(dir.path())
        .args(["-q", "stats"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    let output = vt(dir.path())
        .args(["add", "--json", "--address", "Rua A", "--territory", "T1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["error_code"], "E5001");
}

#[test]
fn broken_config_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    std::fs::write(dir.path().join(".visitas/config.toml"), "[visits\n").unwrap();

    let output = vt(dir.path()).args(["list", "--json"]).output().unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["error_code"], "E1002");
}
