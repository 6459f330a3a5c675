//! Runs the configuration generator and the compile driver.

use anyhow::Result;
use std::path::PathBuf;

use crate::build::config::{BuildConfig, render_args};
use crate::config::PipelineConfig;
use crate::constants::{BUILD_ARTIFACT_RELATIVE_PATH, BUILD_TARGET};
use crate::core::DepvendError;
use crate::platform::PlatformKey;
use crate::process::locator::ToolKind;
use crate::process::{Outcome, ProcessEnvironment, ToolCommand, ToolLocator};

/// Builds the monolithic library for one platform.
#[derive(Debug, Clone)]
pub struct BuildDriver<'a> {
    config: &'a PipelineConfig,
    locator: ToolLocator,
}

impl<'a> BuildDriver<'a> {
    /// Creates a driver. `env` must already have the tools directory on its `PATH`.
    pub fn new(config: &'a PipelineConfig, env: &ProcessEnvironment) -> Self {
        Self {
            config,
            locator: ToolLocator::new(&config.tools_dir, env),
        }
    }

    /// Output directory for `platform`, `<deps>/.build/<os>_<arch>`.
    ///
    /// Namespaced per platform so builds for different targets never share output.
    pub fn output_dir(&self, platform: &PlatformKey) -> PathBuf {
        self.config.build_root().join(platform.dir_name())
    }

    /// `gn gen <out> --args=...`, run from the checkout.
    pub fn configure_command(&self, build: &BuildConfig, platform: &PlatformKey) -> Result<ToolCommand> {
        Ok(self
            .locator
            .command("gn", ToolKind::Script)?
            .current_dir(&self.config.source_dir)
            .arg("gen")
            .arg(self.output_dir(platform).display().to_string())
            .arg(format!("--args={}", render_args(build)))
            .with_context("gn gen"))
    }

    /// `ninja -v -C <out> v8_monolith`, run from the checkout.
    pub fn compile_command(&self, platform: &PlatformKey) -> Result<ToolCommand> {
        Ok(self
            .locator
            .command("ninja", ToolKind::Script)?
            .current_dir(&self.config.source_dir)
            .args(["-v", "-C"])
            .arg(self.output_dir(platform).display().to_string())
            .arg(BUILD_TARGET)
            .with_context("ninja"))
    }

    /// Configures and compiles, returning the produced artifact.
    ///
    /// Both tools write straight to the terminal.
    ///
    /// # Errors
    ///
    /// [`DepvendError::BuildError`] with the tool's exit code if either step
    /// exits non-zero, or if the compile succeeds without producing the artifact.
    pub async fn build(&self, build: &BuildConfig, platform: &PlatformKey) -> Result<PathBuf> {
        if !self.config.source_dir.is_dir() {
            return Err(DepvendError::ConfigurationError {
                message: format!(
                    "source checkout {} does not exist; run `depvend sync` first",
                    self.config.source_dir.display()
                ),
            }
            .into());
        }

        let out_dir = self.output_dir(platform);
        tracing::info!(target: "build", "Configuring {} into {}", platform, out_dir.display());
        tracing::debug!(target: "build", "gn args: {}", render_args(build));
        run_step("gn gen", self.configure_command(build, platform)?).await?;

        tracing::info!(target: "build", "Compiling {}", BUILD_TARGET);
        run_step("ninja", self.compile_command(platform)?).await?;

        let artifact = out_dir.join(BUILD_ARTIFACT_RELATIVE_PATH);
        if !artifact.is_file() {
            return Err(DepvendError::BuildError {
                step: "ninja".to_string(),
                outcome: Outcome {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!("expected artifact {} was not produced", artifact.display()),
                },
            }
            .into());
        }

        tracing::debug!(target: "build", "Produced {}", artifact.display());
        Ok(artifact)
    }
}

async fn run_step(step: &str, command: ToolCommand) -> Result<()> {
    let outcome = command.inherit_stdio().run().await?;
    if outcome.success() {
        Ok(())
    } else {
        Err(DepvendError::BuildError {
            step: step.to_string(),
            outcome,
        }
        .into())
    }
}
