//! Locating required tool binaries.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::DepvendError;
use crate::platform::HostOs;
use crate::process::{ProcessEnvironment, ToolCommand};

/// How a tool is shipped, which decides its file name on Windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Script wrapper (`.bat` on Windows), launched through the command interpreter
    Script,
    /// Native executable (`.exe` on Windows)
    Executable,
}

/// Finds tools in the tools directory first, then on the environment's `PATH`.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    tools_dir: PathBuf,
    env: ProcessEnvironment,
}

impl ToolLocator {
    /// Creates a locator searching `tools_dir`, then `env`'s `PATH`.
    pub fn new(tools_dir: &Path, env: &ProcessEnvironment) -> Self {
        Self {
            tools_dir: tools_dir.to_path_buf(),
            env: env.clone(),
        }
    }

    /// The environment tools found by this locator should run with.
    pub const fn environment(&self) -> &ProcessEnvironment {
        &self.env
    }

    /// OS family tools are located for.
    pub const fn host_os(&self) -> HostOs {
        self.env.host_os()
    }

    /// Resolves a tool to a full path.
    ///
    /// # Errors
    ///
    /// [`DepvendError::ToolNotFound`] when the tool is neither in the tools
    /// directory nor on `PATH`.
    pub fn locate(&self, tool: &str, kind: ToolKind) -> Result<PathBuf> {
        let host_os = self.host_os();
        let file_name = match kind {
            ToolKind::Script => host_os.script_name(tool),
            ToolKind::Executable => host_os.executable_name(tool),
        };

        let candidate = self.tools_dir.join(&file_name);
        if candidate.is_file() {
            tracing::trace!(target: "tool", "Found {} at {}", tool, candidate.display());
            return Ok(candidate);
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| self.tools_dir.clone());
        match which::which_in(&file_name, Some(self.env.path()), cwd) {
            Ok(path) => {
                tracing::trace!(target: "tool", "Found {} on PATH at {}", tool, path.display());
                Ok(path)
            }
            Err(_) => Err(DepvendError::ToolNotFound {
                tool: tool.to_string(),
                searched: self.tools_dir.display().to_string(),
            }
            .into()),
        }
    }

    /// Locates a tool and returns a command pre-configured with the
    /// environment and launcher it needs.
    pub fn command(&self, tool: &str, kind: ToolKind) -> Result<ToolCommand> {
        let path = self.locate(tool, kind)?;
        let cmd = ToolCommand::new(path).environment(&self.env);
        Ok(match kind {
            ToolKind::Script => cmd.launched_for(self.host_os()),
            ToolKind::Executable => cmd,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tools_dir_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("gn"), "").unwrap();
        let env = ProcessEnvironment::from_vars([("PATH", "")], HostOs::Posix);

        let locator = ToolLocator::new(temp.path(), &env);
        let found = locator.locate("gn", ToolKind::Executable).unwrap();
        assert_eq!(found, temp.path().join("gn"));
    }

    #[test]
    fn test_windows_script_suffix() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("gclient.bat"), "").unwrap();
        let env = ProcessEnvironment::from_vars([("Path", "")], HostOs::Windows);

        let locator = ToolLocator::new(temp.path(), &env);
        let found = locator.locate("gclient", ToolKind::Script).unwrap();
        assert_eq!(found.file_name().unwrap(), "gclient.bat");

        let cmd = locator.command("gclient", ToolKind::Script).unwrap();
        assert!(cmd.display_command().starts_with("cmd /c "));
    }

    #[test]
    fn test_missing_tool() {
        let temp = TempDir::new().unwrap();
        let env = ProcessEnvironment::from_vars([("PATH", "")], HostOs::Posix);

        let locator = ToolLocator::new(temp.path(), &env);
        let err = locator.locate("ninja", ToolKind::Executable).unwrap_err();
        match err.downcast_ref::<DepvendError>().unwrap() {
            DepvendError::ToolNotFound {
                tool,
                ..
            } => assert_eq!(tool, "ninja"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
