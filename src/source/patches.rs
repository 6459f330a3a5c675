//! Source patches applied after a sync on Windows hosts.
//!
//! The upstream tree does not build with the MinGW toolchain out of the box.
//! After every sync the checkout is patched in a fixed order, the build's
//! change stamp is regenerated and the compression library's build file is
//! replaced. A patch that does not apply is fatal; the checkout is then left
//! as the failing tool left it.

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::platform::PlatformKey;

/// One patch and the repository it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Patch file
    pub file: PathBuf,
    /// Repository root the patch is applied in
    pub repo_dir: PathBuf,
}

impl Patch {
    /// Short name for messages (the file stem).
    pub fn name(&self) -> String {
        self.file
            .file_stem()
            .map_or_else(|| self.file.display().to_string(), |s| s.to_string_lossy().to_string())
    }
}

/// Everything done to the checkout after a Windows sync, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSet {
    /// Patches, applied in this order
    pub patches: Vec<Patch>,
    /// Checkout where the change stamp script runs
    pub source_dir: PathBuf,
    /// Replacement build file for the compression library
    pub build_file_source: PathBuf,
    /// Build file it replaces
    pub build_file_target: PathBuf,
}

impl PatchSet {
    /// The MinGW patch set. Patch files live in `<deps>/<os>_<arch>/`.
    pub fn mingw(config: &PipelineConfig, platform: &PlatformKey) -> Self {
        let patch_dir = config.deps_dir.join(platform.dir_name());
        let source = config.source_dir.clone();
        Self {
            patches: vec![
                Patch {
                    file: patch_dir.join("0000-add-mingw-main-code-changes.patch"),
                    repo_dir: source.clone(),
                },
                Patch {
                    file: patch_dir.join("0001-add-mingw-toolchain.patch"),
                    repo_dir: source.join("build"),
                },
            ],
            build_file_source: patch_dir.join("zlib.gn"),
            build_file_target: source.join("third_party").join("zlib").join("BUILD.gn"),
            source_dir: source,
        }
    }

    /// Arguments of the change stamp script, relative to the checkout.
    pub fn lastchange_args() -> [&'static str; 3] {
        ["build/util/lastchange.py", "-o", "build/util/LASTCHANGE"]
    }
}
