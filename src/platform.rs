//! Platform resolution.
//!
//! A run computes its [`PlatformKey`] exactly once and hands it (and the
//! [`HostOs`] variant derived from it) to every component that behaves
//! differently per platform. Nothing else in the crate inspects `cfg!` or
//! environment variables to decide platform-specific behaviour.
//!
//! Raw values are normalized the way the artifact directories are named:
//! lowercase, `macos` reported as `darwin`, and the architecture aliases
//! `amd64` (what Windows reports) and `aarch64` folded into `x86_64` and
//! `arm64`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::DepvendError;

/// Operating-system family, as far as the pipeline cares.
///
/// Windows needs batch-file tool wrappers, `cmd /c` launching, and the
/// mingw patch set; everything else is treated the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    /// Linux, macOS and other Unix-likes
    Posix,
    /// Windows
    Windows,
}

impl HostOs {
    /// Classifies a canonical OS name.
    pub fn from_os_name(os: &str) -> Self {
        if os.eq_ignore_ascii_case("windows") {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// File name of a tool that the fetch toolkit ships as a batch wrapper on Windows.
    ///
    /// ```rust
    /// use depvend_cli::platform::HostOs;
    ///
    /// assert_eq!(HostOs::Windows.script_name("gclient"), "gclient.bat");
    /// assert_eq!(HostOs::Posix.script_name("gclient"), "gclient");
    /// ```
    pub fn script_name(self, tool: &str) -> String {
        match self {
            Self::Windows => format!("{tool}.bat"),
            Self::Posix => tool.to_string(),
        }
    }

    /// File name of a native executable tool.
    pub fn executable_name(self, tool: &str) -> String {
        match self {
            Self::Windows => format!("{tool}.exe"),
            Self::Posix => tool.to_string(),
        }
    }

    /// Prefix needed to launch a command (batch files go through `cmd /c`).
    pub const fn launcher(self) -> &'static [&'static str] {
        match self {
            Self::Windows => &["cmd", "/c"],
            Self::Posix => &[],
        }
    }

    /// Separator used in `PATH`.
    pub const fn path_separator(self) -> char {
        match self {
            Self::Windows => ';',
            Self::Posix => ':',
        }
    }
}

/// CPU architectures the build supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Arch {
    /// 64-bit ARM
    #[value(name = "arm64")]
    #[serde(rename = "arm64")]
    Arm64,
    /// 64-bit x86
    #[value(name = "x86_64")]
    #[serde(rename = "x86_64")]
    X86_64,
}

impl Arch {
    /// Every supported architecture.
    pub const ALL: [Self; 2] = [Self::Arm64, Self::X86_64];

    /// Name used in platform keys and artifact directories.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::X86_64 => "x86_64",
        }
    }

    /// CPU name understood by the build-configuration generator.
    pub const fn build_cpu_name(self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::X86_64 => "x64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = DepvendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_arch(s).as_str() {
            "arm64" => Ok(Self::Arm64),
            "x86_64" => Ok(Self::X86_64),
            other => Err(DepvendError::ConfigurationError {
                message: format!("unsupported architecture '{other}' (expected arm64 or x86_64)"),
            }),
        }
    }
}

/// Maps an architecture name to the CPU name the build generator expects.
///
/// Unknown names are returned unchanged after normalization.
///
/// ```rust
/// use depvend_cli::platform::canonical_arch_name;
///
/// assert_eq!(canonical_arch_name("x86_64"), "x64");
/// assert_eq!(canonical_arch_name("arm64"), "arm64");
/// ```
pub fn canonical_arch_name(arch: &str) -> String {
    arch.parse::<Arch>()
        .map_or_else(|_| normalize_arch(arch), |a| a.build_cpu_name().to_string())
}

/// Lowercases an architecture string and folds known aliases.
pub fn normalize_arch(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    match lower.as_str() {
        "amd64" => "x86_64".to_string(),
        "aarch64" => "arm64".to_string(),
        _ => lower,
    }
}

/// Lowercases an OS name; `macos` is reported as `darwin`.
pub fn normalize_os(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if lower == "macos" {
        "darwin".to_string()
    } else {
        lower
    }
}

/// Canonical `(os, arch)` identifier for per-platform build output and artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformKey {
    os: String,
    arch: String,
}

impl PlatformKey {
    /// Creates a key from raw names, normalizing both.
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: normalize_os(os),
            arch: normalize_arch(arch),
        }
    }

    /// Resolves the key of the running machine.
    ///
    /// On Windows the processor architecture is read from
    /// `PROCESSOR_ARCHITECTURE`, which reports 64-bit x86 as `AMD64`.
    ///
    /// # Errors
    ///
    /// Returns [`DepvendError::ConfigurationError`] when the architecture
    /// cannot be determined; the pipeline cannot run without it.
    pub fn resolve() -> Result<Self> {
        let os = std::env::consts::OS;
        let machine = if HostOs::from_os_name(os) == HostOs::Windows {
            std::env::var("PROCESSOR_ARCHITECTURE").map_err(|_| {
                DepvendError::ConfigurationError {
                    message: "PROCESSOR_ARCHITECTURE is not set; cannot determine the host architecture"
                        .to_string(),
                }
            })?
        } else {
            std::env::consts::ARCH.to_string()
        };

        if machine.trim().is_empty() {
            return Err(DepvendError::ConfigurationError {
                message: "host architecture reported as empty".to_string(),
            }
            .into());
        }

        let key = Self::new(os, &machine);
        tracing::debug!("Resolved platform key {}", key);
        Ok(key)
    }

    /// Same OS, different architecture (for cross-arch builds).
    #[must_use]
    pub fn with_arch(&self, arch: Arch) -> Self {
        Self {
            os: self.os.clone(),
            arch: arch.as_str().to_string(),
        }
    }

    /// Canonical OS name.
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Canonical architecture name.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Supported architecture, if the raw one is one of them.
    pub fn supported_arch(&self) -> Option<Arch> {
        self.arch.parse().ok()
    }

    /// OS family of this key.
    pub fn host_os(&self) -> HostOs {
        HostOs::from_os_name(&self.os)
    }

    /// Directory name `<os>_<arch>`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}
