//! Build configuration: from a `(debug, clang, arch)` request to the flat
//! argument string consumed by the configuration generator.
//!
//! [`configure`] is pure. The same request always renders the same string.

use serde::Serialize;
use std::fmt;

use crate::constants::EMBEDDER_STRING;
use crate::platform::Arch;

/// What the user asked for on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildRequest {
    /// Debug build
    pub debug: bool,
    /// Build with clang (the default)
    pub use_clang: bool,
    /// Target architecture
    pub arch: Arch,
}

/// Fully derived build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Debug build
    pub debug: bool,
    /// Build with clang
    pub use_clang: bool,
    /// Target architecture
    pub arch: Arch,
    /// 1 for debug builds, 0 otherwise
    pub symbol_level: u8,
    /// Strip debug info from release builds
    pub strip_debug_info: bool,
    /// Embedder identifier baked into the library
    pub embedder_string: String,
}

impl BuildConfig {
    /// Derives the configuration for `request`.
    pub fn from_request(request: BuildRequest) -> Self {
        Self {
            debug: request.debug,
            use_clang: request.use_clang,
            arch: request.arch,
            symbol_level: u8::from(request.debug),
            strip_debug_info: !request.debug,
            embedder_string: EMBEDDER_STRING.to_string(),
        }
    }

    /// Overrides the embedder identifier.
    #[must_use]
    pub fn with_embedder_string(mut self, embedder: impl Into<String>) -> Self {
        self.embedder_string = embedder.into();
        self
    }

    /// Ordered `(key, value)` pairs handed to the generator.
    pub fn args(&self) -> Vec<(&'static str, GnValue)> {
        let cpu = self.arch.build_cpu_name();
        vec![
            ("is_debug", GnValue::Bool(self.debug)),
            ("is_clang", GnValue::Bool(self.use_clang)),
            ("target_cpu", GnValue::Str(cpu.to_string())),
            ("v8_target_cpu", GnValue::Str(cpu.to_string())),
            ("clang_use_chrome_plugins", GnValue::Bool(false)),
            ("use_custom_libcxx", GnValue::Bool(false)),
            ("use_sysroot", GnValue::Bool(false)),
            ("symbol_level", GnValue::Int(i64::from(self.symbol_level))),
            ("strip_debug_info", GnValue::Bool(self.strip_debug_info)),
            ("is_component_build", GnValue::Bool(false)),
            ("v8_monolithic", GnValue::Bool(true)),
            ("v8_use_external_startup_data", GnValue::Bool(false)),
            ("treat_warnings_as_errors", GnValue::Bool(false)),
            ("v8_embedder_string", GnValue::Str(self.embedder_string.clone())),
            ("v8_enable_gdbjit", GnValue::Bool(false)),
            ("v8_enable_i18n_support", GnValue::Bool(true)),
            ("icu_use_data_file", GnValue::Bool(false)),
            ("v8_enable_test_features", GnValue::Bool(false)),
            ("v8_untrusted_code_mitigations", GnValue::Bool(false)),
            ("exclude_unwind_tables", GnValue::Bool(true)),
        ]
    }
}

/// A value in the generator's argument language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GnValue {
    /// `true` / `false`
    Bool(bool),
    /// Bare integer
    Int(i64),
    /// Double-quoted string
    Str(String),
}

impl fmt::Display for GnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }
}

/// Renders the single-line argument string for `request`.
///
/// ```rust
/// use depvend_cli::build::{BuildRequest, configure};
/// use depvend_cli::platform::Arch;
///
/// let args = configure(BuildRequest { debug: false, use_clang: true, arch: Arch::X86_64 });
/// assert!(args.starts_with("is_debug=false is_clang=true target_cpu=\"x64\""));
/// ```
pub fn configure(request: BuildRequest) -> String {
    render_args(&BuildConfig::from_request(request))
}

/// Renders a derived configuration as `key=value` pairs joined by spaces.
pub fn render_args(config: &BuildConfig) -> String {
    config.args().iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join(" ")
}
