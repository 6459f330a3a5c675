//! depvend CLI entry point
//!
//! Parses arguments, runs the selected pipeline command and maps failures to
//! exit codes:
//!
//! - `0` - success (for `check`: an upgrade is available)
//! - `1` - `check` found the pin up to date
//! - `2` - generic failure
//! - `3` - the release feed could not be reached or parsed

use anyhow::Result;
use clap::Parser;
use depvend_cli::cli;
use depvend_cli::core::error::{exit_code, user_friendly_error};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let code = exit_code(&e);
            user_friendly_error(e).display();
            std::process::exit(code);
        }
    }
}
