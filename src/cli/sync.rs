//! `depvend sync`: fetch the source tree.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cli::CommandContext;
use crate::version::read_pin;

/// Arguments of `depvend sync`.
#[derive(Args, Debug, Default)]
pub struct SyncCommand {
    /// Print the solution spec handed to the fetch tool instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Sync to this revision instead of the one the checkout tracks
    #[arg(long, conflicts_with = "pinned")]
    pub revision: Option<String>,

    /// Sync to the pinned version
    #[arg(long)]
    pub pinned: bool,
}

impl SyncCommand {
    /// Revision to sync to, if any.
    pub fn revision(&self, ctx: &CommandContext) -> Result<Option<String>> {
        if self.pinned {
            return Ok(Some(read_pin(&ctx.config.pin_file)?));
        }
        Ok(self.revision.clone())
    }

    /// Runs the sync (and the Windows patch sequence).
    pub async fn execute(self, ctx: &CommandContext) -> Result<i32> {
        if self.dry_run {
            println!("{}", ctx.config.solution.render_spec());
            return Ok(0);
        }

        let revision = self.revision(ctx)?;
        ctx.pipeline().sync(revision.as_deref()).await?;
        if !ctx.quiet {
            println!("{} {}", "Synced".green().bold(), ctx.config.source_dir.display());
        }
        Ok(0)
    }
}
