//! Command-line interface for depvend.
//!
//! Each subcommand lives in its own module with its clap argument struct and
//! an `execute` method:
//!
//! - `check` - compare the pin with the release feed (exit 0 = upgrade available, 1 = up to date)
//! - `sync` - fetch the source tree, patching it on Windows
//! - `build` - configure, compile and place the static library
//! - `upgrade` - move to the latest stable version and re-vendor headers
//! - `vendor` - reconcile the vendored header tree and manifest
//!
//! Global flags (`--root`, `--config`, `--verbose`, `--quiet`,
//! `--no-progress`) are accepted by every subcommand.
//!
//! ```bash
//! depvend check --json
//! depvend sync
//! depvend build --arch arm64 --debug
//! depvend upgrade --dry-run
//! depvend vendor --prune
//! ```

pub mod build;
pub mod check;
pub mod sync;
pub mod upgrade;
pub mod vendor;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;
use crate::constants::CONFIG_ENV_VAR;
use crate::pipeline::Pipeline;
use crate::platform::PlatformKey;
use crate::utils::progress::ProgressMode;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Hide spinners and stage headers
    pub no_progress: bool,
    /// Only print errors and command results
    pub quiet: bool,
}

impl CliConfig {
    /// Installs the global tracing subscriber on stderr.
    ///
    /// `RUST_LOG` wins over the flag-derived level. Calling this twice is harmless.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Progress mode for this run.
    pub fn progress(&self) -> ProgressMode {
        ProgressMode::new(self.no_progress, self.quiet)
    }
}

/// Build and vendor-synchronization pipeline for the embedded V8 engine.
#[derive(Parser, Debug)]
#[command(
    name = "depvend",
    about = "Build and vendor-synchronization pipeline for the embedded V8 engine",
    version,
    long_about = "depvend tracks the pinned V8 version, fetches and patches its source, builds the \
                  monolithic static library per platform, and keeps the vendored headers and their \
                  generated Go placeholder packages in sync."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding the deps directory and the manifest
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Configuration file (default: <root>/depvend.toml when present)
    #[arg(long, global = true, value_name = "FILE", env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Show debug output, including every tool invocation
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors and command results
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable spinners and stage headers
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare the pinned version with the latest stable release
    Check(check::CheckCommand),
    /// Fetch the source tree and apply platform patches
    Sync(sync::SyncCommand),
    /// Build the static library and place it for the platform
    Build(build::BuildCommand),
    /// Upgrade to the latest stable release and re-vendor headers
    Upgrade(upgrade::UpgradeCommand),
    /// Reconcile the vendored header tree and regenerate the manifest
    Vendor(vendor::VendorCommand),
}

/// What every command needs: the resolved configuration, the platform and
/// the progress mode.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Resolved configuration
    pub config: PipelineConfig,
    /// Host platform
    pub platform: PlatformKey,
    /// Progress output mode
    pub progress: ProgressMode,
    /// Quiet mode
    pub quiet: bool,
}

impl CommandContext {
    /// A pipeline for this context using the ambient environment.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.config.clone(), self.platform.clone(), self.progress)
    }
}

impl Cli {
    /// Settings derived from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };
        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            quiet: self.quiet,
        }
    }

    /// Initializes logging, loads the configuration and runs the subcommand.
    ///
    /// Returns the process exit code for a successful run; `check` uses 1
    /// to report "up to date".
    pub async fn execute(self) -> Result<i32> {
        let cli_config = self.build_config();
        cli_config.init_logging();
        self.execute_with_config(cli_config).await
    }

    /// Runs the subcommand with explicit settings and no logging setup.
    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<i32> {
        let config = PipelineConfig::load(&self.root, self.config.as_deref())?;
        tracing::debug!("Project root {}", config.root_dir.display());

        let ctx = CommandContext {
            config,
            platform: PlatformKey::resolve()?,
            progress: cli_config.progress(),
            quiet: cli_config.quiet,
        };

        match self.command {
            Commands::Check(cmd) => cmd.execute(&ctx).await,
            Commands::Sync(cmd) => cmd.execute(&ctx).await,
            Commands::Build(cmd) => cmd.execute(&ctx).await,
            Commands::Upgrade(cmd) => cmd.execute(&ctx).await,
            Commands::Vendor(cmd) => cmd.execute(&ctx).await,
        }
    }
}
