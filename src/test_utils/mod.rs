//! Test utilities for depvend
//!
//! Helpers shared by the unit tests and the integration tests (enabled with
//! the `test-utils` feature):
//!
//! - [`init_test_logging`] - one-time tracing setup
//! - [`TestProject`] - a temporary project root with a resolved configuration
//! - [`create_include_tree`] - writes a header tree from a compact layout
//! - [`write_fake_tool`] - an executable shell script standing in for an external tool
//!
//! ```rust,no_run
//! use depvend_cli::test_utils::{TestProject, create_include_tree};
//!
//! let project = TestProject::new().unwrap();
//! create_include_tree(&project.config.source_include_dir, &[("v8", &["v8.h"]), ("cppgc", &["heap.h"])])
//!     .unwrap();
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;
use crate::constants::CONFIG_FILE_NAME;

static INIT_LOGGING: Once = Once::new();

/// Initializes logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// A temporary project root.
///
/// The directory is removed when the value is dropped.
pub struct TestProject {
    /// Owns the temporary directory
    pub temp: TempDir,
    /// Configuration resolved against the temporary root
    pub config: PipelineConfig,
}

impl TestProject {
    /// Creates an empty project root with the deps directory in place.
    pub fn new() -> Result<Self> {
        init_test_logging(None);
        let temp = TempDir::new()?;
        let config = PipelineConfig::with_root(temp.path());
        std::fs::create_dir_all(&config.deps_dir)?;
        Ok(Self {
            temp,
            config,
        })
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Writes the pin file.
    pub fn write_pin(&self, version: &str) -> Result<()> {
        std::fs::write(&self.config.pin_file, version)?;
        Ok(())
    }

    /// Reads the pin file.
    pub fn read_pin(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.config.pin_file)?)
    }

    /// Writes a local release feed announcing `latest` and points the
    /// configuration at it through a `file://` URL.
    pub fn write_feed(&mut self, latest: &str) -> Result<String> {
        let feed = self.root().join("all.json");
        std::fs::write(
            &feed,
            format!(r#"[{{"os": "linux", "versions": [{{"channel": "stable", "v8_version": "{latest}"}}]}}]"#),
        )?;
        let url = format!("file://{}", feed.display());
        self.config.feed.url = url.clone();
        Ok(url)
    }

    /// Writes `depvend.toml` at the root with the given body.
    pub fn write_config_file(&self, body: &str) -> Result<PathBuf> {
        let path = self.root().join(CONFIG_FILE_NAME);
        std::fs::write(&path, body)?;
        Ok(path)
    }

    /// Contents of the generated manifest.
    pub fn read_manifest(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.config.manifest_path())?)
    }
}

/// Writes a header tree under `root`.
///
/// Each entry is a top-level directory and the files inside it; file names
/// may contain `/` for nested directories. Every file gets a short
/// deterministic body naming its path.
pub fn create_include_tree(root: &Path, layout: &[(&str, &[&str])]) -> Result<()> {
    std::fs::create_dir_all(root)?;
    for (dir, files) in layout {
        let dir_path = root.join(dir);
        std::fs::create_dir_all(&dir_path)?;
        for file in *files {
            let path = dir_path.join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, format!("// {dir}/{file}\n"))?;
        }
    }
    Ok(())
}

/// Writes an executable `#!/bin/sh` script named `name` into `dir`.
pub fn write_fake_tool(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(path)
}

/// Relative paths of every file under `root`, sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path().strip_prefix(root).ok().map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}
