//! Pipeline configuration.
//!
//! All locations and settings a run needs are resolved once into a
//! [`PipelineConfig`] and passed explicitly into each component. Nothing in
//! the crate reads module-level path constants or mutates the process
//! environment.
//!
//! # Configuration file
//!
//! An optional `depvend.toml` at the project root overrides the defaults.
//! Every key is optional and relative paths are resolved against the root:
//!
//! ```toml
//! deps_dir = "deps"
//! tools_dir = "deps/depot_tools"
//! pin_file = "deps/v8_version"
//! lock_timeout_secs = 120
//!
//! [feed]
//! url = "https://omahaproxy.appspot.com/all.json?os=linux&channel=stable"
//! engine = "v8"
//!
//! [manifest]
//! file = "cgo.go"
//! module_path = "rogchap.com/v8go"
//!
//! [solution]
//! name = "v8"
//! exclusions = ["v8/testing/gmock", "v8/tools/gyp"]
//!
//! [solution.custom_vars]
//! build_for_node = true
//! ```
//!
//! The file is chosen by `--config`, then the `DEPVEND_CONFIG` environment
//! variable, then `<root>/depvend.toml` if it exists.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    BUILD_OUTPUT_DIR, CONFIG_FILE_NAME, DEFAULT_DEPS_DIR, DEFAULT_ENGINE, DEFAULT_FEED_URL,
    DEFAULT_INCLUDE_DIR, DEFAULT_MANIFEST_FILE, DEFAULT_MANIFEST_PACKAGE, DEFAULT_MODULE_PATH,
    DEFAULT_PIN_FILE, DEFAULT_TOOLS_DIR, EMBEDDER_STRING, LOCKS_DIR, default_lock_timeout,
};
use crate::core::DepvendError;
use crate::source::Solution;

/// Where the latest stable version is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Feed URL
    pub url: String,
    /// Engine name; the feed field read is `<engine>_version`
    pub engine: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

/// How the generated manifest file looks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// Manifest file, relative to the project root
    pub file: PathBuf,
    /// Go module path of the host project
    pub module_path: String,
    /// Go package the manifest belongs to
    pub package: String,
    /// Lines placed between the package clause and the import block
    pub preamble: Vec<String>,
    /// Packages (relative to the module) always imported, besides the vendored directories
    pub fixed_imports: Vec<String>,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_MANIFEST_FILE),
            module_path: DEFAULT_MODULE_PATH.to_string(),
            package: DEFAULT_MANIFEST_PACKAGE.to_string(),
            preamble: vec![
                "//go:generate clang-format -i --verbose -style=Chromium v8go.h v8go.cc".to_string(),
                String::new(),
                "// #cgo CXXFLAGS: -fno-rtti -fPIC -std=c++17 -DV8_COMPRESS_POINTERS -DV8_31BIT_SMIS_ON_64BIT_ARCH -I${SRCDIR}/deps/include -Wall -DV8_ENABLE_SANDBOX".to_string(),
                "// #cgo LDFLAGS: -pthread -lv8".to_string(),
                "// #cgo darwin,amd64 LDFLAGS: -L${SRCDIR}/deps/darwin_x86_64".to_string(),
                "// #cgo darwin,arm64 LDFLAGS: -L${SRCDIR}/deps/darwin_arm64".to_string(),
                "// #cgo linux,amd64 LDFLAGS: -L${SRCDIR}/deps/linux_x86_64 -ldl".to_string(),
                "// #cgo linux,arm64 LDFLAGS: -L${SRCDIR}/deps/linux_arm64 -ldl".to_string(),
                "import \"C\"".to_string(),
            ],
            fixed_imports: vec![
                "deps/darwin_arm64".to_string(),
                "deps/darwin_x86_64".to_string(),
                "deps/include".to_string(),
                "deps/linux_arm64".to_string(),
                "deps/linux_x86_64".to_string(),
            ],
        }
    }
}

/// Build settings that are not chosen per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Embedder identifier baked into the library
    pub embedder_string: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            embedder_string: EMBEDDER_STRING.to_string(),
        }
    }
}

/// On-disk form of `depvend.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Deps directory
    pub deps_dir: Option<PathBuf>,
    /// Fetch toolkit directory
    pub tools_dir: Option<PathBuf>,
    /// Upstream checkout
    pub source_dir: Option<PathBuf>,
    /// Header directory inside the checkout
    pub source_include_dir: Option<PathBuf>,
    /// Vendored header directory
    pub dest_include_dir: Option<PathBuf>,
    /// Pin file
    pub pin_file: Option<PathBuf>,
    /// Seconds to wait for the pipeline lock
    pub lock_timeout_secs: Option<u64>,
    /// Release feed
    pub feed: FeedSettings,
    /// Generated manifest
    pub manifest: ManifestSettings,
    /// Fetch-tool solution
    pub solution: Solution,
    /// Static build settings
    pub build: BuildSettings,
}

impl ConfigFile {
    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// [`DepvendError::ConfigurationError`] if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DepvendError::ConfigurationError {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            DepvendError::ConfigurationError {
                message: format!("invalid configuration in {}: {e}", path.display()),
            }
            .into()
        })
    }
}

/// Fully resolved configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Project root (where the manifest lives)
    pub root_dir: PathBuf,
    /// Deps directory holding the checkout, tools, pin and artifacts
    pub deps_dir: PathBuf,
    /// Fetch toolkit directory, prepended to `PATH` for every tool
    pub tools_dir: PathBuf,
    /// Upstream checkout
    pub source_dir: PathBuf,
    /// Header directory inside the checkout
    pub source_include_dir: PathBuf,
    /// Vendored header directory
    pub dest_include_dir: PathBuf,
    /// Pin file
    pub pin_file: PathBuf,
    /// Release feed
    pub feed: FeedSettings,
    /// Generated manifest
    pub manifest: ManifestSettings,
    /// Fetch-tool solution
    pub solution: Solution,
    /// Static build settings
    pub build: BuildSettings,
    /// How long to wait for the pipeline lock
    pub lock_timeout: Duration,
}

impl PipelineConfig {
    /// Configuration with every default, rooted at `root`.
    pub fn with_root(root: &Path) -> Self {
        Self::from_file(root, ConfigFile::default())
    }

    /// Resolves a parsed configuration file against `root`.
    pub fn from_file(root: &Path, file: ConfigFile) -> Self {
        let root_dir = root.to_path_buf();
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { root_dir.join(p) };

        let deps_dir = resolve(file.deps_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DEPS_DIR)));
        let tools_dir = file.tools_dir.map_or_else(|| deps_dir.join(DEFAULT_TOOLS_DIR), &resolve);
        let source_dir =
            file.source_dir.map_or_else(|| deps_dir.join(&file.solution.name), &resolve);
        let source_include_dir = file
            .source_include_dir
            .map_or_else(|| source_dir.join(DEFAULT_INCLUDE_DIR), &resolve);
        let dest_include_dir =
            file.dest_include_dir.map_or_else(|| deps_dir.join(DEFAULT_INCLUDE_DIR), &resolve);
        let pin_file = file.pin_file.map_or_else(|| deps_dir.join(DEFAULT_PIN_FILE), &resolve);
        let lock_timeout =
            file.lock_timeout_secs.map_or_else(default_lock_timeout, Duration::from_secs);

        Self {
            root_dir: root_dir.clone(),
            deps_dir,
            tools_dir,
            source_dir,
            source_include_dir,
            dest_include_dir,
            pin_file,
            feed: file.feed,
            manifest: file.manifest,
            solution: file.solution,
            build: file.build,
            lock_timeout,
        }
    }

    /// Loads the configuration for `root`.
    ///
    /// `explicit` (from `--config` or `DEPVEND_CONFIG`) must exist; otherwise
    /// `<root>/depvend.toml` is used when present and defaults apply when not.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to determine current directory")?
                .join(root)
        };

        let file = match explicit {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                ConfigFile::load_from(path)?
            }
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                if default_path.is_file() {
                    tracing::debug!("Loading configuration from {}", default_path.display());
                    ConfigFile::load_from(&default_path)?
                } else {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    ConfigFile::default()
                }
            }
        };

        let config = Self::from_file(&root, file);
        config.validate()?;
        Ok(config)
    }

    /// Rejects layouts the manifest cannot express: the vendored include
    /// root must sit inside the project root.
    fn validate(&self) -> Result<()> {
        let inside = self.dest_include_dir.strip_prefix(&self.root_dir).is_ok_and(|relative| {
            relative.components().all(|c| matches!(c, std::path::Component::Normal(_)))
        });
        if !inside {
            return Err(DepvendError::ConfigurationError {
                message: format!(
                    "dest_include_dir {} must be inside the project root {}",
                    self.dest_include_dir.display(),
                    self.root_dir.display()
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Build output root; one subdirectory per platform key.
    pub fn build_root(&self) -> PathBuf {
        self.deps_dir.join(BUILD_OUTPUT_DIR)
    }

    /// Directory holding lock files.
    pub fn locks_dir(&self) -> PathBuf {
        self.deps_dir.join(LOCKS_DIR)
    }

    /// Absolute path of the generated manifest.
    pub fn manifest_path(&self) -> PathBuf {
        if self.manifest.file.is_absolute() {
            self.manifest.file.clone()
        } else {
            self.root_dir.join(&self.manifest.file)
        }
    }

    /// Import path prefix of vendored include directories, e.g. `rogchap.com/v8go/deps/include`.
    pub fn include_import_prefix(&self) -> String {
        let relative = self
            .dest_include_dir
            .strip_prefix(&self.root_dir)
            .unwrap_or(&self.dest_include_dir);
        let relative: Vec<String> =
            relative.components().map(|c| c.as_os_str().to_string_lossy().to_string()).collect();
        format!("{}/{}", self.manifest.module_path.trim_end_matches('/'), relative.join("/"))
    }
}
