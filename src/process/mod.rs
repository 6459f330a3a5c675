//! External process plumbing.
//!
//! Every external tool (fetch toolkit, git, build generator, compiler
//! driver) is launched through [`ToolCommand`] with an explicit
//! [`ProcessEnvironment`]. The ambient environment of the depvend process is
//! copied once and never mutated.
//!
//! A finished invocation yields an [`Outcome`]; deciding whether a non-zero
//! exit is fatal, and which typed error it becomes, is the caller's job.

pub mod command_builder;
pub mod locator;

pub use command_builder::ToolCommand;
pub use locator::ToolLocator;

use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use crate::platform::HostOs;

/// Result of a finished external process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Exit code, `None` when the process was killed by a signal or timed out
    pub exit_code: Option<i32>,
    /// Captured standard output (empty when stdio was inherited)
    pub stdout: String,
    /// Captured standard error (empty when stdio was inherited)
    pub stderr: String,
}

impl Outcome {
    /// Whether the process exited with code 0.
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// The tool's own diagnostic output: stderr if any, otherwise stdout.
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Environment handed to external processes.
///
/// Built from a copy of the ambient environment with the tools directory
/// prepended to `PATH`, then passed to each [`ToolCommand`] explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEnvironment {
    vars: BTreeMap<String, String>,
    host_os: HostOs,
}

impl ProcessEnvironment {
    /// Copies the environment of the current process.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_ambient(host_os: HostOs) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v): (OsString, OsString)| {
                Some((k.into_string().ok()?, v.into_string().ok()?))
            })
            .collect();
        Self {
            vars,
            host_os,
        }
    }

    /// Builds an environment from explicit variables.
    pub fn from_vars<I, K, V>(vars: I, host_os: HostOs) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            host_os,
        }
    }

    /// Returns a copy with `dir` prepended to `PATH`.
    #[must_use]
    pub fn with_prepended_path(mut self, dir: &Path) -> Self {
        let key = self.path_key();
        let dir = dir.display().to_string();
        let value = match self.vars.get(&key) {
            Some(existing) if !existing.is_empty() => {
                format!("{dir}{}{existing}", self.host_os.path_separator())
            }
            _ => dir,
        };
        self.vars.insert(key, value);
        self
    }

    /// Looks up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Current `PATH` value (empty if unset).
    pub fn path(&self) -> &str {
        self.get(&self.path_key()).unwrap_or("")
    }

    /// OS family the environment is meant for.
    pub const fn host_os(&self) -> HostOs {
        self.host_os
    }

    /// All variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // Windows spells it `Path`; keep whatever spelling is already there
    fn path_key(&self) -> String {
        match self.host_os {
            HostOs::Windows => self
                .vars
                .keys()
                .find(|k| k.eq_ignore_ascii_case("PATH"))
                .cloned()
                .unwrap_or_else(|| "PATH".to_string()),
            HostOs::Posix => "PATH".to_string(),
        }
    }
}
