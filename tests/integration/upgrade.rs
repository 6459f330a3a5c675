use depvend_cli::pipeline::{Pipeline, UpgradeOptions, UpgradeOutcome};
use depvend_cli::platform::PlatformKey;
use depvend_cli::test_utils::TestProject;
use depvend_cli::utils::progress::ProgressMode;

fn pipeline(project: &TestProject) -> Pipeline {
    Pipeline::new(project.config.clone(), PlatformKey::new("linux", "x86_64"), ProgressMode::disabled())
}

#[tokio::test]
async fn test_up_to_date_upgrade_changes_nothing() {
    let mut project = TestProject::new().unwrap();
    project.write_pin("9.1.0").unwrap();
    project.write_feed("9.1.0").unwrap();

    let outcome = pipeline(&project).upgrade(UpgradeOptions::default()).await.unwrap();
    assert!(matches!(outcome, UpgradeOutcome::UpToDate { .. }));
    assert!(!project.config.dest_include_dir.exists());
    assert!(!project.config.manifest_path().exists());
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use crate::depvend;
    use depvend_cli::test_utils::{create_include_tree, write_fake_tool};

    // `fetch` creates a checkout with headers; `git` records its arguments
    fn install_tools(project: &TestProject) {
        let tools = &project.config.tools_dir;
        let source = project.config.source_dir.display().to_string();
        write_fake_tool(
            tools,
            "fetch",
            &format!(
                "mkdir -p '{source}/.git' '{source}/include/v8' '{source}/include/cppgc'\n\
                 echo '// v8' > '{source}/include/v8/v8.h'\n\
                 echo '// cppgc' > '{source}/include/cppgc/heap.h'"
            ),
        )
        .unwrap();
        let log = project.root().join("git.log");
        write_fake_tool(tools, "git", &format!("echo \"$@\" >> '{}'", log.display())).unwrap();
    }

    #[tokio::test]
    async fn test_upgrade_checks_out_vendors_and_pins() {
        let mut project = TestProject::new().unwrap();
        project.write_pin("9.0.1").unwrap();
        project.write_feed("9.1.0").unwrap();
        install_tools(&project);

        let outcome = pipeline(&project).upgrade(UpgradeOptions::default()).await.unwrap();
        match outcome {
            UpgradeOutcome::Upgraded {
                drift,
                report,
            } => {
                assert_eq!(drift.latest, "9.1.0");
                assert_eq!(report.created_dirs, vec!["cppgc", "v8"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert_eq!(project.read_pin().unwrap(), "9.1.0");
        let git_log = std::fs::read_to_string(project.root().join("git.log")).unwrap();
        assert!(git_log.contains("fetch --tags --force"));
        assert!(git_log.contains("checkout 9.1.0"));
        assert!(git_log.contains("rev-parse HEAD"));
        assert!(project.config.dest_include_dir.join("cppgc/vendor.go").is_file());
        assert!(project.read_manifest().unwrap().contains("deps/include/cppgc"));
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_old_pin() {
        let mut project = TestProject::new().unwrap();
        project.write_pin("9.0.1").unwrap();
        project.write_feed("9.1.0").unwrap();
        install_tools(&project);
        write_fake_tool(&project.config.tools_dir, "git", "exit 128").unwrap();

        assert!(pipeline(&project).upgrade(UpgradeOptions::default()).await.is_err());
        assert_eq!(project.read_pin().unwrap(), "9.0.1");
        assert!(!project.config.manifest_path().exists());
    }

    #[tokio::test]
    async fn test_force_upgrade_reuses_checkout() {
        let mut project = TestProject::new().unwrap();
        project.write_pin("9.1.0").unwrap();
        project.write_feed("9.1.0").unwrap();
        install_tools(&project);
        std::fs::create_dir_all(project.config.source_dir.join(".git")).unwrap();
        create_include_tree(&project.config.source_include_dir, &[("v8", &["v8.h"])]).unwrap();
        // A second fetch would fail; the existing checkout must be reused
        write_fake_tool(&project.config.tools_dir, "fetch", "exit 1").unwrap();

        let outcome = pipeline(&project)
            .upgrade(UpgradeOptions {
                force: true,
                ..UpgradeOptions::default()
            })
            .await
            .unwrap();
        assert!(matches!(outcome, UpgradeOutcome::Upgraded { .. }));
        assert!(project.config.dest_include_dir.join("v8/v8.h").is_file());
    }

    #[test]
    fn test_dry_run_from_cli() {
        let mut project = TestProject::new().unwrap();
        project.write_pin("9.0.1").unwrap();
        let url = project.write_feed("9.1.0").unwrap();
        project.write_config_file(&format!("[feed]\nurl = '{url}'\n")).unwrap();
        install_tools(&project);

        depvend(project.root())
            .args(["upgrade", "--dry-run"])
            .assert()
            .success()
            .stdout(predicates::str::contains("Would upgrade 9.0.1 -> 9.1.0"));

        assert_eq!(project.read_pin().unwrap(), "9.0.1");
        assert!(!project.root().join("git.log").exists());
        assert!(!project.config.source_dir.exists());
    }
}
