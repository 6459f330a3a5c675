//! `depvend vendor`: reconcile the vendored headers with the checkout.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::CommandContext;
use crate::vendor::{ReconcileOptions, ReconcileReport};

/// Arguments of `depvend vendor`.
#[derive(Args, Debug, Default)]
pub struct VendorCommand {
    /// Delete vendored directories that no longer exist upstream
    #[arg(long)]
    pub prune: bool,

    /// Print the reconcile report as JSON
    #[arg(long)]
    pub json: bool,
}

impl VendorCommand {
    /// Runs one reconcile.
    pub async fn execute(self, ctx: &CommandContext) -> Result<i32> {
        let report = ctx
            .pipeline()
            .vendor(ReconcileOptions {
                prune: self.prune,
            })
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize report")?);
        } else if !ctx.quiet {
            print_report(&report);
        }
        Ok(0)
    }
}

/// Human-readable summary of a reconcile.
pub fn print_report(report: &ReconcileReport) {
    for dir in &report.created_dirs {
        println!("  {} {dir}", "+".green());
    }
    for dir in &report.repaired_placeholders {
        println!("  {} {dir} (placeholder restored)", "~".yellow());
    }
    for dir in &report.pruned_dirs {
        println!("  {} {dir}", "-".red());
    }
    for dir in &report.stale_dirs {
        println!("  {} {dir} (no longer upstream, kept)", "!".yellow());
    }
    println!(
        "{} {} directories, {} files copied{}",
        "Vendored".green().bold(),
        report.manifest_dirs.len(),
        report.copied_files,
        if report.manifest_changed { ", manifest updated" } else { "" }
    );
}
