//! Progress indicators for pipeline stages.
//!
//! Short in-process stages (reconcile, version check) show a spinner. Stages
//! that hand the terminal to an external tool (fetch, compile) must not, so
//! they only print a stage header.
//!
//! Spinners are hidden when `--no-progress` is given, when
//! `DEPVEND_NO_PROGRESS` is set, or when stderr is not a terminal.

use colored::Colorize;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Environment variable disabling all progress output.
pub const NO_PROGRESS_ENV: &str = "DEPVEND_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some() || !std::io::stderr().is_terminal()
}

/// Whether stage output is shown at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressMode {
    enabled: bool,
}

impl ProgressMode {
    /// Mode from the CLI flags; `quiet` or `no_progress` turn everything off.
    pub fn new(no_progress: bool, quiet: bool) -> Self {
        Self {
            enabled: !no_progress && !quiet && !is_progress_disabled(),
        }
    }

    /// Mode with all output off.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
        }
    }

    /// Whether indicators are shown.
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Starts a spinner for an in-process stage.
    pub fn spinner(self, message: impl Into<String>) -> StageSpinner {
        let inner = if self.enabled {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            IndicatifBar::hidden()
        };
        inner.set_message(message.into());
        StageSpinner {
            inner,
        }
    }

    /// Announces a stage whose tool writes directly to the terminal.
    pub fn stage_header(self, stage: &str, detail: &str) {
        if self.enabled {
            eprintln!("{} {}", format!("==> {stage}").cyan().bold(), detail);
        }
    }
}

/// Spinner shown while one stage runs.
pub struct StageSpinner {
    inner: IndicatifBar,
}

impl StageSpinner {
    /// Stops the spinner, leaving `msg` on screen.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    /// Stops and removes the spinner.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
}
