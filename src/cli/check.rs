//! `depvend check`: is a newer stable release available?
//!
//! Exit codes are meant for scripts and CI:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | the pin differs from the latest stable version (upgrade available) |
//! | 1 | the pin is the latest stable version |
//! | 3 | the release feed could not be reached or parsed |
//! | 2 | any other failure (e.g. a missing pin file) |

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::CommandContext;
use crate::version::DriftResult;

/// Exit code when the pin matches the feed.
pub const EXIT_UP_TO_DATE: i32 = 1;

/// Arguments of `depvend check`.
#[derive(Args, Debug, Default)]
pub struct CheckCommand {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    /// Runs the drift check.
    pub async fn execute(self, ctx: &CommandContext) -> Result<i32> {
        let result = ctx.pipeline().check().await?;
        self.report(&result, ctx.quiet)?;
        Ok(exit_code_for(&result))
    }

    fn report(&self, result: &DriftResult, quiet: bool) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result).context("Failed to serialize result")?);
        } else if result.drifted {
            println!(
                "{} {} -> {}",
                "Upgrade available:".yellow().bold(),
                result.current,
                result.latest.green()
            );
        } else if !quiet {
            println!("{} {}", "Up to date:".green().bold(), result.current);
        }
        Ok(())
    }
}

/// Exit code for a finished check.
pub const fn exit_code_for(result: &DriftResult) -> i32 {
    if result.drifted { 0 } else { EXIT_UP_TO_DATE }
}
