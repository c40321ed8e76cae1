use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn thrift(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_thrift"));
    cmd.env_remove("RUST_LOG").arg("--data-dir").arg(data_dir);
    cmd
}

#[test]
fn test_parse_and_format() {
    let dir = tempdir().unwrap();

    thrift(dir.path())
        .args(["parse", "1 1/2"])
        .assert()
        .success()
        .stdout("1 1/2\"\n");

    thrift(dir.path())
        .args(["parse", "19.4 mm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a valid measurement"));

    thrift(dir.path())
        .args(["parse", "--json", "--unit", "mm", "19"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""unit":"mm""#));
}

#[test]
fn test_convert_and_compare() {
    let dir = tempdir().unwrap();

    thrift(dir.path())
        .args(["convert", "3/4\"", "--to", "mm"])
        .assert()
        .success()
        .stdout("19 mm\n");

    thrift(dir.path())
        .args(["compare", "3/4\"", "19 mm"])
        .assert()
        .success()
        .stdout("equal\n");

    thrift(dir.path())
        .args(["compare", "3/4\"", "21 mm"])
        .assert()
        .success()
        .stdout("not equal\n");
}

#[test]
fn test_catalog_lists_groups() {
    let dir = tempdir().unwrap();

    thrift(dir.path())
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("MDF\tSheet\t-"))
        .stdout(predicate::str::contains("[Plywood] Baltic Birch"))
        .stdout(predicate::str::contains("[Solid] Walnut"));
}

#[test]
fn test_project_and_cutlist_persist() {
    let dir = tempdir().unwrap();

    thrift(dir.path())
        .args(["project", "add"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Project"));
    thrift(dir.path())
        .args(["project", "add"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Project 2"));

    thrift(dir.path())
        .args(["project", "edit", "New Project", "--name", "Hall Table"])
        .assert()
        .success();

    thrift(dir.path())
        .args([
            "cutlist",
            "add",
            "Hall Table",
            "--material",
            "[Solid] Walnut",
            "--thickness",
            "3/4\"",
            "--width",
            "5 1/2",
            "--length",
            "36",
            "--quantity",
            "4",
            "--grain",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("3/4\" x 5 1/2\" x 36\"\tx4\tgrain"));

    thrift(dir.path())
        .args(["project", "show", "Hall Table"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Hall Table\n"))
        .stdout(predicate::str::contains("[Solid] Walnut"));

    assert!(dir.path().join("thrift-v1.json").exists());
}

#[test]
fn test_cutlist_add_rejects_bad_measurement() {
    let dir = tempdir().unwrap();
    thrift(dir.path()).args(["project", "add"]).assert().success();

    thrift(dir.path())
        .args([
            "cutlist",
            "add",
            "New Project",
            "--material",
            "MDF",
            "--thickness",
            "3/4",
            "--width",
            "24 1/",
            "--length",
            "48",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Width '24 1/' is not a valid measurement"));

    thrift(dir.path())
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 pieces"));
}

#[test]
fn test_preferences_change_parsing() {
    let dir = tempdir().unwrap();

    thrift(dir.path()).args(["prefs", "unit", "mm"]).assert().success();

    thrift(dir.path())
        .args(["parse", "19"])
        .assert()
        .success()
        .stdout("19 mm\n");

    thrift(dir.path())
        .args(["prefs", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unit\tmm"));
}

#[test]
fn test_backup_reset_restore() {
    let dir = tempdir().unwrap();
    let backup = dir.path().join("backup.json");

    thrift(dir.path()).args(["project", "add"]).assert().success();
    thrift(dir.path())
        .arg("backup")
        .arg("--output")
        .arg(&backup)
        .assert()
        .success();
    assert!(fs::read_to_string(&backup).unwrap().contains("\"schemaVersion\": \"1\""));

    thrift(dir.path()).arg("reset").assert().failure();
    thrift(dir.path()).args(["reset", "--yes"]).assert().success();
    thrift(dir.path())
        .args(["project", "list"])
        .assert()
        .success()
        .stdout("");

    thrift(dir.path())
        .arg("restore")
        .arg(&backup)
        .assert()
        .success()
        .stdout("Restored 1 projects\n");
    thrift(dir.path())
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Project"));
}

#[test]
fn test_corrupt_state_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("thrift-v1.json"), "{not json").unwrap();

    thrift(dir.path())
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid state"));
}
