use depvend_cli::test_utils::TestProject;
use predicates::prelude::*;

use crate::depvend;

#[test]
fn test_dry_run_prints_solution() {
    let project = TestProject::new().unwrap();

    depvend(project.root())
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("solutions = [{'name': 'v8'"));
}

#[test]
fn test_pinned_without_pin_file_fails() {
    let project = TestProject::new().unwrap();

    depvend(project.root())
        .args(["sync", "--pinned"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pin file"));
}

#[test]
fn test_revision_conflicts_with_pinned() {
    let project = TestProject::new().unwrap();

    depvend(project.root()).args(["sync", "--pinned", "--revision", "9.1.0"]).assert().failure();
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use depvend_cli::test_utils::write_fake_tool;

    fn install_gclient(project: &TestProject) -> std::path::PathBuf {
        let log = project.root().join("gclient.log");
        write_fake_tool(&project.config.tools_dir, "gclient", &format!("echo \"$@\" >> '{}'", log.display()))
            .unwrap();
        log
    }

    #[test]
    fn test_sync_pinned_passes_revision() {
        let project = TestProject::new().unwrap();
        project.write_pin("9.1.0").unwrap();
        let log = install_gclient(&project);

        depvend(project.root()).args(["sync", "--pinned"]).assert().success();

        let args = std::fs::read_to_string(log).unwrap();
        assert!(args.starts_with("sync --spec solutions = "));
        assert!(args.trim_end().ends_with("--revision v8@9.1.0"));
    }

    #[test]
    fn test_sync_without_revision_tracks_checkout() {
        let project = TestProject::new().unwrap();
        let log = install_gclient(&project);

        depvend(project.root()).arg("sync").assert().success();

        let args = std::fs::read_to_string(log).unwrap();
        assert!(!args.contains("--revision"));
    }
}
