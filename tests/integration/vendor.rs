use depvend_cli::test_utils::{TestProject, create_include_tree};
use predicates::prelude::*;

use crate::depvend;

#[test]
fn test_vendor_command_reconciles_tree() {
    let project = TestProject::new().unwrap();
    create_include_tree(
        &project.config.source_include_dir,
        &[("v8", &["v8.h"]), ("cppgc", &["heap.h"])],
    )
    .unwrap();

    depvend(project.root())
        .arg("vendor")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ cppgc"))
        .stdout(predicate::str::contains("Vendored 2 directories"));

    let dest = &project.config.dest_include_dir;
    assert!(dest.join("cppgc/vendor.go").is_file());
    assert!(dest.join("v8/v8.h").is_file());
    assert!(project.read_manifest().unwrap().contains("_ \"rogchap.com/v8go/deps/include/cppgc\""));

    // The lock file stays behind but is released once the command exits
    assert!(project.config.locks_dir().join("pipeline.lock").is_file());
    depvend(project.root()).arg("vendor").assert().success();
}

#[test]
fn test_vendor_json_report() {
    let project = TestProject::new().unwrap();
    create_include_tree(&project.config.source_include_dir, &[("v8", &["v8.h"])]).unwrap();

    let output = depvend(project.root()).args(["vendor", "--json"]).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["created_dirs"], serde_json::json!(["v8"]));
    assert_eq!(report["manifest_changed"], true);
}

#[test]
fn test_vendor_prune_flag() {
    let project = TestProject::new().unwrap();
    create_include_tree(&project.config.source_include_dir, &[("v8", &["v8.h"])]).unwrap();
    create_include_tree(&project.config.dest_include_dir, &[("retired", &["gone.h"])]).unwrap();

    depvend(project.root())
        .arg("vendor")
        .assert()
        .success()
        .stdout(predicate::str::contains("retired (no longer upstream, kept)"));
    assert!(project.config.dest_include_dir.join("retired").is_dir());

    depvend(project.root()).args(["vendor", "--prune"]).assert().success();
    assert!(!project.config.dest_include_dir.join("retired").exists());
}

#[test]
fn test_vendor_without_checkout_fails() {
    let project = TestProject::new().unwrap();

    depvend(project.root())
        .arg("vendor")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("depvend sync"));
}
