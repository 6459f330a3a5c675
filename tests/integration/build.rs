use depvend_cli::platform::{Arch, PlatformKey};
use depvend_cli::test_utils::TestProject;
use predicates::prelude::*;

use crate::depvend;

#[test]
fn test_print_args_release_x64() {
    let project = TestProject::new().unwrap();

    depvend(project.root())
        .args(["build", "--print-args", "--arch", "x86_64"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("is_debug=false is_clang=true target_cpu=\"x64\""))
        .stdout(predicate::str::contains("symbol_level=0 strip_debug_info=true"))
        .stdout(predicate::str::contains("v8_embedder_string=\"-v8go\""));
}

#[test]
fn test_print_args_debug_without_clang() {
    let project = TestProject::new().unwrap();

    depvend(project.root())
        .args(["build", "--print-args", "--debug", "--no-clang", "--arch", "arm64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is_debug=true is_clang=false target_cpu=\"arm64\""))
        .stdout(predicate::str::contains("symbol_level=1 strip_debug_info=false"));
}

#[test]
fn test_print_args_uses_configured_embedder() {
    let project = TestProject::new().unwrap();
    project.write_config_file("[build]\nembedder_string = \"-custom\"\n").unwrap();

    depvend(project.root())
        .args(["build", "--print-args", "--arch", "arm64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v8_embedder_string=\"-custom\""));
}

#[test]
fn test_unknown_arch_is_rejected() {
    let project = TestProject::new().unwrap();

    depvend(project.root()).args(["build", "--arch", "mips"]).assert().failure();
}

#[cfg(unix)]
#[test]
fn test_build_places_library() {
    use depvend_cli::test_utils::write_fake_tool;

    let project = TestProject::new().unwrap();
    std::fs::create_dir_all(&project.config.source_dir).unwrap();
    let tools = &project.config.tools_dir;
    write_fake_tool(tools, "gn", "mkdir -p \"$2/obj\"").unwrap();
    write_fake_tool(tools, "ninja", "printf 'archive' > \"$3/obj/libv8_monolith.a\"").unwrap();

    depvend(project.root())
        .args(["build", "--arch", "arm64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("libv8.a"));

    let host = PlatformKey::resolve().unwrap().with_arch(Arch::Arm64);
    let placed = project.config.deps_dir.join(host.dir_name()).join("libv8.a");
    assert_eq!(std::fs::read_to_string(placed).unwrap(), "archive");
}

#[cfg(unix)]
#[test]
fn test_failed_compile_places_nothing() {
    use depvend_cli::test_utils::write_fake_tool;

    let project = TestProject::new().unwrap();
    std::fs::create_dir_all(&project.config.source_dir).unwrap();
    let tools = &project.config.tools_dir;
    write_fake_tool(tools, "gn", "mkdir -p \"$2/obj\"").unwrap();
    write_fake_tool(tools, "ninja", "echo 'compile error' >&2; exit 4").unwrap();

    depvend(project.root()).args(["build", "--arch", "x86_64"]).assert().code(4);

    let host = PlatformKey::resolve().unwrap().with_arch(Arch::X86_64);
    let placed = project.config.deps_dir.join(host.dir_name());
    assert!(!placed.join("libv8.a").exists());
}
