//! `depvend build`: configure, compile and place the static library.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::build::{BuildRequest, render_args};
use crate::cli::CommandContext;
use crate::core::DepvendError;
use crate::platform::{Arch, PlatformKey};

/// Arguments of `depvend build`.
#[derive(Args, Debug, Default)]
pub struct BuildCommand {
    /// Debug build (symbols kept, no stripping)
    #[arg(long)]
    pub debug: bool,

    /// Build with the system toolchain instead of the bundled clang
    #[arg(long)]
    pub no_clang: bool,

    /// Target architecture (default: the host architecture)
    #[arg(long, value_enum)]
    pub arch: Option<Arch>,

    /// Print the build arguments and exit without running any tool
    #[arg(long)]
    pub print_args: bool,
}

impl BuildCommand {
    /// The request described by these flags on `platform`.
    pub fn request(&self, platform: &PlatformKey) -> Result<BuildRequest> {
        let arch = self.arch.or_else(|| platform.supported_arch()).ok_or_else(|| {
            DepvendError::ConfigurationError {
                message: format!(
                    "host architecture '{}' is not supported; pass --arch arm64 or --arch x86_64",
                    platform.arch()
                ),
            }
        })?;
        Ok(BuildRequest {
            debug: self.debug,
            use_clang: !self.no_clang,
            arch,
        })
    }

    /// Runs the build, or prints its arguments with `--print-args`.
    pub async fn execute(self, ctx: &CommandContext) -> Result<i32> {
        let request = self.request(&ctx.platform)?;
        let pipeline = ctx.pipeline();

        if self.print_args {
            println!("{}", render_args(&pipeline.build_config(request)));
            return Ok(0);
        }

        let placed = pipeline.build(request).await?;
        if !ctx.quiet {
            println!("{} {}", "Placed".green().bold(), placed.path.display());
            println!("  sha256 {}", placed.sha256.dimmed());
        }
        Ok(0)
    }
}
