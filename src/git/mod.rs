//! Git operations on the upstream checkout.
//!
//! A thin wrapper over the system `git` binary, run through
//! [`ToolCommand`] with the pipeline's explicit environment. Only the handful
//! of operations the pipeline needs are exposed: fetching, checking out a
//! pinned revision, applying source patches and reading `HEAD`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::constants::GIT_OPERATION_TIMEOUT;
use crate::process::locator::ToolKind;
use crate::process::{Outcome, ToolCommand, ToolLocator};

/// A git working copy.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
    locator: ToolLocator,
}

impl GitRepo {
    /// Wraps the working copy at `path`. Nothing is checked until a command runs.
    pub fn new(path: impl AsRef<Path>, locator: &ToolLocator) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            locator: locator.clone(),
        }
    }

    /// Working copy directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory looks like a git checkout.
    pub fn is_git_repo(&self) -> bool {
        self.path.join(".git").exists()
    }

    fn command(&self) -> Result<ToolCommand> {
        Ok(self.locator.command("git", ToolKind::Executable)?.current_dir(&self.path))
    }

    /// Fetches all refs and tags from the remotes.
    pub async fn fetch(&self) -> Result<()> {
        self.command()?
            .args(["fetch", "--tags", "--force"])
            .inherit_stdio()
            .with_context("fetch")
            .run_success("fetch")
            .await?;
        Ok(())
    }

    /// Checks out `revision` (a tag, branch or commit) on a detached head.
    pub async fn checkout(&self, revision: &str) -> Result<()> {
        self.command()?
            .args(["checkout", revision])
            .with_timeout(Some(GIT_OPERATION_TIMEOUT))
            .with_context("checkout")
            .run_success("checkout")
            .await?;
        Ok(())
    }

    /// Applies `patch` verbosely and returns the outcome whether or not it applied.
    pub async fn apply(&self, patch: &Path) -> Result<Outcome> {
        self.command()?
            .args(["apply", "-v"])
            .arg(patch.display().to_string())
            .with_timeout(Some(GIT_OPERATION_TIMEOUT))
            .with_context("patch")
            .run()
            .await
    }

    /// Commit hash of `HEAD`.
    pub async fn current_commit(&self) -> Result<String> {
        let outcome = self
            .command()?
            .args(["rev-parse", "HEAD"])
            .with_timeout(Some(GIT_OPERATION_TIMEOUT))
            .run_success("rev-parse")
            .await?;
        Ok(outcome.stdout.trim().to_string())
    }
}
