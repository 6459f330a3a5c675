//! Fetching and preparing the upstream source tree.
//!
//! [`SourceSync`] drives the fetch toolkit: it brings the checkout under the
//! deps directory in line with the upstream dependency manifest, applies the
//! Windows patch set when needed, and moves the checkout to a pinned revision
//! during an upgrade.
//!
//! Repeated syncs are idempotent from the pipeline's point of view.

pub mod patches;
pub mod solution;

pub use patches::{Patch, PatchSet};
pub use solution::{CustomVar, ExclusionSet, Solution};

use anyhow::Result;

use crate::config::PipelineConfig;
use crate::core::DepvendError;
use crate::git::GitRepo;
use crate::platform::{HostOs, PlatformKey};
use crate::process::locator::ToolKind;
use crate::process::{Outcome, ProcessEnvironment, ToolCommand, ToolLocator};
use crate::utils::fs::{copy_file, ensure_dir};

/// Runs the fetch toolkit against the configured solution.
#[derive(Debug, Clone)]
pub struct SourceSync<'a> {
    config: &'a PipelineConfig,
    platform: PlatformKey,
    locator: ToolLocator,
}

impl<'a> SourceSync<'a> {
    /// Creates a sync for `platform`. `env` must already have the tools
    /// directory on its `PATH`.
    pub fn new(config: &'a PipelineConfig, platform: &PlatformKey, env: &ProcessEnvironment) -> Self {
        Self {
            config,
            platform: platform.clone(),
            locator: ToolLocator::new(&config.tools_dir, env),
        }
    }

    /// The `gclient sync` invocation, without running it.
    ///
    /// With `revision` the solution is synced to that revision, otherwise to
    /// whatever the checkout currently tracks.
    pub fn sync_command(&self, revision: Option<&str>) -> Result<ToolCommand> {
        let solution = &self.config.solution;
        let mut cmd = self
            .locator
            .command("gclient", ToolKind::Script)?
            .current_dir(&self.config.deps_dir)
            .args(["sync", "--spec"])
            .arg(solution.render_spec());
        if let Some(revision) = revision {
            cmd = cmd.arg("--revision").arg(format!("{}@{}", solution.name, revision));
        }
        Ok(cmd.with_context("sync"))
    }

    /// Syncs the checkout to `revision` (or the current one) and, on
    /// Windows, patches it.
    ///
    /// The fetch tool's output goes straight to the terminal.
    ///
    /// # Errors
    ///
    /// - [`DepvendError::ToolNotFound`] if `gclient` cannot be located
    /// - [`DepvendError::ToolFailed`] if the sync exits non-zero
    /// - [`DepvendError::PatchError`] if a Windows patch does not apply
    pub async fn sync(&self, revision: Option<&str>) -> Result<()> {
        ensure_dir(&self.config.deps_dir)?;

        tracing::info!(
            "Syncing {}@{} into {}",
            self.config.solution.name,
            revision.unwrap_or("HEAD"),
            self.config.deps_dir.display()
        );
        self.sync_command(revision)?.inherit_stdio().run_success("sync").await?;

        if self.platform.host_os() == HostOs::Windows {
            self.apply_patches(&PatchSet::mingw(self.config, &self.platform)).await?;
        }
        Ok(())
    }

    /// Applies `set` in order, then regenerates the change stamp and swaps
    /// in the replacement build file.
    pub async fn apply_patches(&self, set: &PatchSet) -> Result<()> {
        for patch in &set.patches {
            tracing::info!("Applying patch {}", patch.name());
            if !patch.file.is_file() {
                return Err(DepvendError::PatchError {
                    patch: patch.name(),
                    outcome: Outcome {
                        exit_code: None,
                        stdout: String::new(),
                        stderr: format!("patch file {} does not exist", patch.file.display()),
                    },
                }
                .into());
            }

            let outcome = GitRepo::new(&patch.repo_dir, &self.locator).apply(&patch.file).await?;
            if !outcome.success() {
                return Err(DepvendError::PatchError {
                    patch: patch.name(),
                    outcome,
                }
                .into());
            }
        }

        tracing::debug!("Regenerating change stamp in {}", set.source_dir.display());
        self.locator
            .command("python3", ToolKind::Script)?
            .current_dir(&set.source_dir)
            .args(PatchSet::lastchange_args())
            .with_context("patch")
            .run_success("patch")
            .await?;

        tracing::debug!(
            "Replacing {} with {}",
            set.build_file_target.display(),
            set.build_file_source.display()
        );
        copy_file(&set.build_file_source, &set.build_file_target)?;
        Ok(())
    }

    /// Moves the checkout to `version`, bootstrapping it with `fetch` when
    /// there is no checkout yet.
    pub async fn checkout(&self, version: &str) -> Result<()> {
        ensure_dir(&self.config.deps_dir)?;
        let repo = GitRepo::new(&self.config.source_dir, &self.locator);

        if repo.is_git_repo() {
            tracing::debug!("Reusing checkout at {}", repo.path().display());
        } else {
            tracing::info!("No checkout at {}, fetching", repo.path().display());
            self.locator
                .command("fetch", ToolKind::Script)?
                .current_dir(&self.config.deps_dir)
                .arg(self.config.solution.name.clone())
                .inherit_stdio()
                .with_context("fetch")
                .run_success("fetch")
                .await?;
        }

        repo.fetch().await?;
        tracing::info!("Checking out {}", version);
        repo.checkout(version).await?;
        let head = repo.current_commit().await?;
        tracing::debug!("{} is at {}", version, head);
        Ok(())
    }
}
