use depvend_cli::test_utils::TestProject;
use predicates::prelude::*;

use crate::depvend;

fn project_with_feed(pin: &str, latest: &str) -> TestProject {
    let mut project = TestProject::new().unwrap();
    project.write_pin(pin).unwrap();
    let url = project.write_feed(latest).unwrap();
    project.write_config_file(&format!("[feed]\nurl = '{url}'\n")).unwrap();
    project
}

#[test]
fn test_check_reports_upgrade_available() {
    let project = project_with_feed("9.0.257.19", "9.1.269.28");

    depvend(project.root())
        .arg("check")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("9.0.257.19 -> 9.1.269.28"));
}

#[test]
fn test_check_up_to_date_exits_one() {
    let project = project_with_feed("9.1.269.28", "9.1.269.28");

    depvend(project.root())
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_check_json_output() {
    let project = project_with_feed("9.0.1", "9.1.0");

    let output = depvend(project.root()).args(["check", "--json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["current"], "9.0.1");
    assert_eq!(value["latest"], "9.1.0");
    assert_eq!(value["drifted"], true);
}

#[test]
fn test_check_missing_pin_is_generic_failure() {
    let mut project = TestProject::new().unwrap();
    let url = project.write_feed("9.1.0").unwrap();
    project.write_config_file(&format!("[feed]\nurl = '{url}'\n")).unwrap();

    depvend(project.root())
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("v8_version"));
}

#[test]
fn test_check_malformed_feed_exits_three() {
    let project = TestProject::new().unwrap();
    project.write_pin("9.0.1").unwrap();
    let feed = project.root().join("all.json");
    std::fs::write(&feed, r#"{"unexpected": true}"#).unwrap();
    project.write_config_file(&format!("[feed]\nurl = 'file://{}'\n", feed.display())).unwrap();

    depvend(project.root()).arg("check").assert().code(3);
}

#[test]
fn test_check_unreachable_feed_exits_three() {
    let project = TestProject::new().unwrap();
    project.write_pin("9.0.1").unwrap();
    let missing = project.root().join("missing.json");
    project.write_config_file(&format!("[feed]\nurl = 'file://{}'\n", missing.display())).unwrap();

    depvend(project.root()).arg("check").assert().code(3);
}

#[test]
fn test_config_file_from_environment() {
    let project = project_with_feed("9.0.1", "9.1.0");
    let elsewhere = tempfile::TempDir::new().unwrap();
    let config = elsewhere.path().join("custom.toml");
    std::fs::copy(project.root().join("depvend.toml"), &config).unwrap();
    std::fs::remove_file(project.root().join("depvend.toml")).unwrap();

    depvend(project.root()).env("DEPVEND_CONFIG", &config).arg("check").assert().code(0);
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let project = TestProject::new().unwrap();
    project.write_pin("9.0.1").unwrap();
    project.write_config_file("no_such_key = 1\n").unwrap();

    depvend(project.root()).arg("check").assert().code(2);
}
