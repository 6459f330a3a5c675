//! `depvend upgrade`: move the checkout to the latest stable release.
//!
//! Nothing happens when the pin already matches the feed, unless `--force`
//! is given. `--dry-run` reports the drift and the reconcile plan without
//! touching the checkout, the vendored tree or the pin.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::CommandContext;
use crate::cli::vendor::print_report;
use crate::pipeline::{UpgradeOptions, UpgradeOutcome};

/// Arguments of `depvend upgrade`.
#[derive(Args, Debug, Default)]
pub struct UpgradeCommand {
    /// Upgrade even if the pin matches the latest release
    #[arg(long)]
    pub force: bool,

    /// Show what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete vendored directories that no longer exist upstream
    #[arg(long)]
    pub prune: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpgradeCommand {
    /// Runs the upgrade.
    pub async fn execute(self, ctx: &CommandContext) -> Result<i32> {
        let outcome = ctx
            .pipeline()
            .upgrade(UpgradeOptions {
                force: self.force,
                dry_run: self.dry_run,
                prune: self.prune,
            })
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?);
            return Ok(0);
        }

        match outcome {
            UpgradeOutcome::UpToDate {
                drift,
            } => {
                if !ctx.quiet {
                    println!("{} {}", "Already up to date:".green().bold(), drift.current);
                }
            }
            UpgradeOutcome::Planned {
                drift,
                plan,
            } => {
                println!("Would upgrade {} -> {}", drift.current, drift.latest.green());
                match plan {
                    Some(plan) => {
                        for dir in &plan.new_dirs {
                            println!("  {} {dir}", "+".green());
                        }
                        for dir in &plan.missing_placeholders {
                            println!("  {} {dir} (placeholder missing)", "~".yellow());
                        }
                        for dir in &plan.stale_dirs {
                            println!("  {} {dir} (no longer upstream)", "!".yellow());
                        }
                    }
                    None => println!("  (no checkout yet; vendored tree changes unknown)"),
                }
            }
            UpgradeOutcome::Upgraded {
                drift,
                report,
            } => {
                if !ctx.quiet {
                    print_report(&report);
                }
                println!("{} {} -> {}", "Upgraded".green().bold(), drift.current, drift.latest);
            }
        }
        Ok(0)
    }
}
