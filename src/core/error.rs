//! Error handling for depvend
//!
//! The pipeline distinguishes failures by the stage that produced them. Every
//! stage failure is fatal: the remaining stages are skipped and the process
//! exits non-zero. Nothing is retried; re-running the command is the recovery
//! path, which is safe because fetch and reconcile are idempotent.
//!
//! # Architecture
//!
//! - [`DepvendError`] - the typed taxonomy raised at stage boundaries
//! - [`ErrorContext`] - wrapper adding details and a suggestion for the CLI
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! Internally most functions return [`anyhow::Result`] and attach context with
//! [`anyhow::Context`]; a typed [`DepvendError`] anywhere in the chain is found
//! again by [`user_friendly_error`] and by [`exit_code`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use depvend_cli::core::{DepvendError, user_friendly_error};
//!
//! let err = anyhow::Error::from(DepvendError::ConfigurationError {
//!     message: "pin file deps/v8_version is missing".to_string(),
//! });
//! let ctx = user_friendly_error(err);
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::constants::{EXIT_FEED_UNREACHABLE, EXIT_GENERIC_FAILURE};
use crate::process::Outcome;

/// The main error type for depvend operations.
///
/// Variants map one-to-one to pipeline stages so the CLI can tell the user
/// which stage failed. Variants produced by an external tool keep the tool's
/// exit code and captured output so they can be surfaced verbatim.
#[derive(Error, Debug, Clone)]
pub enum DepvendError {
    /// Missing or malformed local state: the pin file, the configuration
    /// file, or a lock held by another run.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// What is missing or malformed
        message: String,
    },

    /// A required tool binary could not be located.
    #[error("Required tool '{tool}' was not found in {searched} or on PATH")]
    ToolNotFound {
        /// Tool name without platform suffix (e.g. "gn")
        tool: String,
        /// Directory searched before PATH
        searched: String,
    },

    /// The release feed could not be reached.
    #[error("Network error while {operation}: {reason}")]
    NetworkError {
        /// What was being fetched
        operation: String,
        /// Transport-level reason
        reason: String,
    },

    /// The release feed answered with an unexpected shape.
    #[error("Unexpected response from {source_name}: {reason}")]
    ParseError {
        /// Where the response came from
        source_name: String,
        /// What was missing or malformed
        reason: String,
    },

    /// A source patch failed to apply. The checkout is in an unknown state.
    #[error("Failed to apply patch '{patch}'")]
    PatchError {
        /// Patch name (file stem)
        patch: String,
        /// Output of the failing tool
        outcome: Outcome,
    },

    /// The configure or compile step exited non-zero.
    #[error("Build step '{step}' failed")]
    BuildError {
        /// Which step failed ("gn gen" or "ninja")
        step: String,
        /// Output of the failing tool
        outcome: Outcome,
    },

    /// Any other external tool exited non-zero.
    #[error("'{tool}' failed during {stage}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Pipeline stage that invoked the tool
        stage: String,
        /// Output of the failing tool
        outcome: Outcome,
    },

    /// Copy/delete/write failure, mostly during vendor-tree reconciliation.
    #[error("File system error during {operation}: {path}")]
    FilesystemError {
        /// What was being done
        operation: String,
        /// Path involved
        path: String,
        /// Underlying error message
        reason: String,
    },

    /// Another pipeline run holds the destination lock.
    #[error("Timed out after {seconds}s waiting for lock '{name}'")]
    LockTimeout {
        /// Lock name
        name: String,
        /// Seconds waited
        seconds: u64,
    },
}

impl DepvendError {
    /// Builds a [`DepvendError::FilesystemError`] from an I/O failure.
    pub fn filesystem(
        operation: impl Into<String>,
        path: &std::path::Path,
        err: &std::io::Error,
    ) -> Self {
        Self::FilesystemError {
            operation: operation.into(),
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// The external tool output attached to this error, if any.
    pub const fn outcome(&self) -> Option<&Outcome> {
        match self {
            Self::PatchError {
                outcome,
                ..
            }
            | Self::BuildError {
                outcome,
                ..
            }
            | Self::ToolFailed {
                outcome,
                ..
            } => Some(outcome),
            _ => None,
        }
    }

    /// Process exit code for this error.
    ///
    /// Tool failures propagate the tool's own exit code; feed failures use
    /// [`EXIT_FEED_UNREACHABLE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NetworkError {
                ..
            }
            | Self::ParseError {
                ..
            } => EXIT_FEED_UNREACHABLE,
            _ => self
                .outcome()
                .and_then(|o| o.exit_code)
                .filter(|code| *code != 0)
                .unwrap_or(EXIT_GENERIC_FAILURE),
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// Rendered on stderr by the binary: the error in red, details in yellow,
/// and a suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DepvendError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details, e.g. the failing tool's stderr
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: DepvendError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }

    /// Process exit code for the wrapped error.
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Finds the first [`DepvendError`] anywhere in an error chain.
pub fn find_depvend_error(error: &anyhow::Error) -> Option<&DepvendError> {
    error.chain().find_map(|cause| cause.downcast_ref::<DepvendError>())
}

/// Process exit code for any error returned by a command.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    find_depvend_error(error).map_or(EXIT_GENERIC_FAILURE, DepvendError::exit_code)
}

/// Converts an error into an [`ErrorContext`] with stage-specific guidance.
///
/// External tool output is passed through untouched as the details so the
/// user sees exactly what the tool printed.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(err) = find_depvend_error(&error) {
        return create_error_context(err.clone(), &error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(DepvendError::FilesystemError {
            operation: "file access".to_string(),
            path: "unknown".to_string(),
            reason: io_error.to_string(),
        })
        .with_suggestion("Check that the path exists and that you have permission to modify it");
    }

    ErrorContext::new(DepvendError::ConfigurationError {
        message: format!("{error:#}"),
    })
}

fn create_error_context(err: DepvendError, chain: &anyhow::Error) -> ErrorContext {
    let tool_output = err.outcome().map(Outcome::diagnostics);

    let ctx = match &err {
        DepvendError::ConfigurationError {
            ..
        } => ErrorContext::new(err.clone()).with_suggestion(
            "Check depvend.toml and the pin file; run from the project root or pass --root",
        ),
        DepvendError::ToolNotFound {
            tool,
            ..
        } => {
            let suggestion = format!(
                "Install the fetch toolkit into the tools directory or put '{tool}' on PATH"
            );
            ErrorContext::new(err.clone()).with_suggestion(suggestion)
        }
        DepvendError::NetworkError {
            ..
        }
        | DepvendError::ParseError {
            ..
        } => ErrorContext::new(err.clone())
            .with_details("The latest stable version could not be determined")
            .with_suggestion("Check your connection or the feed_url setting, then re-run"),
        DepvendError::PatchError {
            ..
        } => ErrorContext::new(err.clone()).with_suggestion(
            "The checkout may be partially patched; reset it (git checkout -- . in the source dir) before syncing again",
        ),
        DepvendError::BuildError {
            ..
        } => ErrorContext::new(err.clone())
            .with_suggestion("Re-run with --verbose to see the full tool invocation"),
        DepvendError::ToolFailed {
            ..
        } => ErrorContext::new(err.clone()),
        DepvendError::FilesystemError {
            reason,
            ..
        } => ErrorContext::new(err.clone())
            .with_details(reason.clone())
            .with_suggestion("Re-run the command; reconciliation is safe to repeat"),
        DepvendError::LockTimeout {
            ..
        } => ErrorContext::new(err.clone())
            .with_suggestion("Another depvend run is using this project; wait for it to finish"),
    };

    match tool_output {
        Some(output) if !output.is_empty() => ctx.with_details(output),
        _ if ctx.details.is_none() => {
            // Surface the outermost context when the typed error sits deeper in the chain
            let outer = chain.to_string();
            if outer == err.to_string() {
                ctx
            } else {
                ctx.with_details(outer)
            }
        }
        _ => ctx,
    }
}
