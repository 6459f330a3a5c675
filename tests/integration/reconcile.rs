use depvend_cli::test_utils::{TestProject, create_include_tree, list_files};
use depvend_cli::vendor::{ReconcileOptions, Reconciler, render_placeholder, vendored_dirs};

const INCLUDE_PREFIX: &str = "rogchap.com/v8go/deps/include";

fn reconciler(project: &TestProject) -> Reconciler {
    Reconciler::from_config(&project.config).unwrap()
}

fn snapshot(project: &TestProject) -> Vec<(String, Vec<u8>)> {
    let dest = &project.config.dest_include_dir;
    let mut files: Vec<(String, Vec<u8>)> = list_files(dest)
        .into_iter()
        .map(|rel| {
            let bytes = std::fs::read(dest.join(&rel)).unwrap();
            (rel, bytes)
        })
        .collect();
    files.push(("<manifest>".to_string(), project.read_manifest().unwrap().into_bytes()));
    files
}

#[test]
fn test_fresh_tree_gets_placeholders_and_imports() {
    let project = TestProject::new().unwrap();
    create_include_tree(
        &project.config.source_include_dir,
        &[("v8", &["v8.h"]), ("cppgc", &["heap.h", "internal/api-constants.h"])],
    )
    .unwrap();

    let report = reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();
    assert_eq!(report.created_dirs, vec!["cppgc", "v8"]);

    let dest = &project.config.dest_include_dir;
    assert_eq!(
        std::fs::read_to_string(dest.join("cppgc/vendor.go")).unwrap(),
        render_placeholder("cppgc")
    );
    assert!(dest.join("v8/vendor.go").is_file());
    assert!(dest.join("cppgc/internal/api-constants.h").is_file());

    let manifest = project.read_manifest().unwrap();
    let include_lines: Vec<&str> = manifest.lines().filter(|l| l.contains("deps/include/")).collect();
    assert_eq!(
        include_lines,
        vec![
            "\t_ \"rogchap.com/v8go/deps/include/cppgc\"",
            "\t_ \"rogchap.com/v8go/deps/include/v8\"",
        ]
    );
}

#[test]
fn test_second_run_is_byte_identical() {
    let project = TestProject::new().unwrap();
    create_include_tree(
        &project.config.source_include_dir,
        &[("libplatform", &["libplatform.h"]), ("v8", &["v8.h", "v8-version.h"])],
    )
    .unwrap();

    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();
    let first = snapshot(&project);

    let report = reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();
    assert!(report.created_dirs.is_empty());
    assert!(!report.manifest_changed);
    assert_eq!(snapshot(&project), first);
}

#[test]
fn test_upstream_header_changes_are_picked_up() {
    let project = TestProject::new().unwrap();
    let source = &project.config.source_include_dir;
    create_include_tree(source, &[("v8", &["v8.h", "old.h"])]).unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    std::fs::remove_file(source.join("v8/old.h")).unwrap();
    std::fs::write(source.join("v8/v8.h"), "// updated\n").unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    let dest = &project.config.dest_include_dir;
    assert!(!dest.join("v8/old.h").exists());
    assert_eq!(std::fs::read_to_string(dest.join("v8/v8.h")).unwrap(), "// updated\n");
    assert!(dest.join("v8/vendor.go").is_file());
}

#[test]
fn test_no_directory_ever_loses_its_placeholder() {
    let project = TestProject::new().unwrap();
    create_include_tree(&project.config.source_include_dir, &[("v8", &["v8.h"])]).unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    let dest = &project.config.dest_include_dir;
    std::fs::remove_file(dest.join("v8/vendor.go")).unwrap();
    let report = reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    assert_eq!(report.repaired_placeholders, vec!["v8"]);
    assert!(dest.join("v8/vendor.go").is_file());
    assert!(dest.join("vendor.go").is_file());
}

#[test]
fn test_customised_placeholder_is_kept() {
    let project = TestProject::new().unwrap();
    create_include_tree(&project.config.source_include_dir, &[("v8", &["v8.h"])]).unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    let placeholder = project.config.dest_include_dir.join("v8/vendor.go");
    std::fs::write(&placeholder, "package v8 // hand edited\n").unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    assert_eq!(std::fs::read_to_string(&placeholder).unwrap(), "package v8 // hand edited\n");
}

#[test]
fn test_stale_directory_is_kept_and_listed() {
    let project = TestProject::new().unwrap();
    let source = &project.config.source_include_dir;
    create_include_tree(source, &[("v8", &["v8.h"]), ("retired", &["gone.h"])]).unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    std::fs::remove_dir_all(source.join("retired")).unwrap();
    let report = reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    assert_eq!(report.stale_dirs, vec!["retired"]);
    let dest = &project.config.dest_include_dir;
    assert!(dest.join("retired/vendor.go").is_file());
    // Its copied headers are swept; only the placeholder survives
    assert!(!dest.join("retired/gone.h").exists());
    let listed = vendored_dirs(&project.read_manifest().unwrap(), INCLUDE_PREFIX);
    assert_eq!(listed, vec!["retired", "v8"]);
}

#[test]
fn test_prune_removes_stale_directory() {
    let project = TestProject::new().unwrap();
    let source = &project.config.source_include_dir;
    create_include_tree(source, &[("v8", &["v8.h"]), ("retired", &["gone.h"])]).unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    std::fs::remove_dir_all(source.join("retired")).unwrap();
    let report = reconciler(&project)
        .reconcile(ReconcileOptions {
            prune: true,
        })
        .unwrap();

    assert_eq!(report.pruned_dirs, vec!["retired"]);
    assert!(report.manifest_changed);
    assert!(!project.config.dest_include_dir.join("retired").exists());
    let listed = vendored_dirs(&project.read_manifest().unwrap(), INCLUDE_PREFIX);
    assert_eq!(listed, vec!["v8"]);
}

#[test]
fn test_manifest_lists_every_vendored_directory() {
    let project = TestProject::new().unwrap();
    create_include_tree(
        &project.config.source_include_dir,
        &[("zeta", &["z.h"]), ("alpha", &["a.h"]), ("mid-dir", &["m.h"])],
    )
    .unwrap();
    reconciler(&project).reconcile(ReconcileOptions::default()).unwrap();

    let listed = vendored_dirs(&project.read_manifest().unwrap(), INCLUDE_PREFIX);
    let on_disk: Vec<String> = std::fs::read_dir(&project.config.dest_include_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    assert_eq!(listed, on_disk);
    assert_eq!(listed, vec!["alpha", "mid-dir", "zeta"]);
}

#[test]
fn test_missing_source_is_configuration_error() {
    let project = TestProject::new().unwrap();
    let err = reconciler(&project).reconcile(ReconcileOptions::default()).unwrap_err();
    assert!(err.to_string().contains("depvend sync"));
    assert!(!project.config.dest_include_dir.exists());
}
