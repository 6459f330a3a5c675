//! Global constants used throughout the depvend codebase.
//!
//! File names, default locations, and timeouts that more than one module
//! needs live here so the defaults of [`PipelineConfig`](crate::config::PipelineConfig)
//! and the code that consumes them never drift apart.

use std::time::Duration;

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "depvend.toml";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV_VAR: &str = "DEPVEND_CONFIG";

/// Directory (relative to the project root) holding everything dependency related.
pub const DEFAULT_DEPS_DIR: &str = "deps";

/// Fetch toolkit checkout inside the deps directory.
pub const DEFAULT_TOOLS_DIR: &str = "depot_tools";

/// Name of the upstream solution; also the checkout directory name.
pub const DEFAULT_SOLUTION_NAME: &str = "v8";

/// Upstream repository the solution is fetched from.
pub const DEFAULT_SOLUTION_URL: &str = "https://chromium.googlesource.com/v8/v8.git";

/// Dependency manifest file inside the upstream repository.
pub const DEFAULT_DEPS_FILE: &str = "DEPS";

/// Plain-text file recording the pinned upstream version.
pub const DEFAULT_PIN_FILE: &str = "v8_version";

/// Release feed listing the latest stable versions.
pub const DEFAULT_FEED_URL: &str = "https://omahaproxy.appspot.com/all.json?os=linux&channel=stable";

/// Engine name used to pick `versions[0].<engine>_version` from the feed.
pub const DEFAULT_ENGINE: &str = "v8";

/// Vendored header directory inside the deps directory.
pub const DEFAULT_INCLUDE_DIR: &str = "include";

/// Generated manifest file at the project root.
pub const DEFAULT_MANIFEST_FILE: &str = "cgo.go";

/// Go module path of the host project.
pub const DEFAULT_MODULE_PATH: &str = "rogchap.com/v8go";

/// Go package name of the generated manifest.
pub const DEFAULT_MANIFEST_PACKAGE: &str = "v8go";

/// Placeholder file written into every vendored directory.
pub const PLACEHOLDER_FILE_NAME: &str = "vendor.go";

/// Files matching this pattern survive the residue sweep of a reconcile.
pub const PLACEHOLDER_PATTERN: &str = "*.go";

/// Build output root inside the deps directory; one subdirectory per platform.
pub const BUILD_OUTPUT_DIR: &str = ".build";

/// Ninja target producing the monolithic static library.
pub const BUILD_TARGET: &str = "v8_monolith";

/// Location of the produced library relative to the build output directory.
pub const BUILD_ARTIFACT_RELATIVE_PATH: &str = "obj/libv8_monolith.a";

/// File name of the placed library inside `<deps>/<os>_<arch>/`.
pub const LIBRARY_ARTIFACT_NAME: &str = "libv8.a";

/// Embedder identifier baked into the library for diagnostics.
pub const EMBEDDER_STRING: &str = "-v8go";

/// Directory (inside the deps directory) holding cross-process lock files.
pub const LOCKS_DIR: &str = ".locks";

/// Lock name guarding every mutating command.
pub const PIPELINE_LOCK_NAME: &str = "pipeline";

/// Default timeout for acquiring the pipeline lock (120 seconds).
///
/// Another run holding the lock is usually in the middle of a fetch or a
/// compile, so a short timeout would fail spuriously.
pub fn default_lock_timeout() -> Duration {
    Duration::from_secs(120)
}

/// Maximum backoff delay while polling for the pipeline lock (500ms).
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Starting delay for the lock polling backoff (10ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// Timeout for the release feed request (30 seconds).
pub const FEED_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for short git operations such as `git apply` or `git checkout` (5 minutes).
pub const GIT_OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Process exit code used when the release feed cannot be reached or parsed.
pub const EXIT_FEED_UNREACHABLE: i32 = 3;

/// Process exit code for failures that carry no exit code of their own.
pub const EXIT_GENERIC_FAILURE: i32 = 2;
