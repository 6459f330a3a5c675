//! Builder for external tool invocations
//!
//! Fluent API for constructing and running the external tools the pipeline
//! drives, with consistent logging, timeouts and output capture.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::DepvendError;
use crate::platform::HostOs;
use crate::process::{Outcome, ProcessEnvironment};

/// Builder for running one external tool.
///
/// Unlike a plain [`Command`], running a `ToolCommand` never turns a
/// non-zero exit into an error: [`run`](Self::run) returns the [`Outcome`]
/// and the caller decides which stage error it is. Only failures to launch
/// the process at all (or a timeout) come back as `Err`.
///
/// # Examples
///
/// ```rust,no_run
/// use depvend_cli::platform::HostOs;
/// use depvend_cli::process::{ProcessEnvironment, ToolCommand};
///
/// # async fn example() -> anyhow::Result<()> {
/// let env = ProcessEnvironment::from_ambient(HostOs::Posix);
/// let outcome = ToolCommand::new("ninja")
///     .args(["-C", "out/linux_x86_64", "v8_monolith"])
///     .environment(&env)
///     .with_context("build")
///     .run()
///     .await?;
/// assert!(outcome.success());
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: none (builds and fetches routinely take longer than any sane limit)
/// - **Output capture**: enabled
/// - **Environment**: inherited from the parent unless [`environment`](Self::environment) is set
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program to run (bare name resolved on PATH, or a full path)
    program: PathBuf,

    /// Arguments passed to the program
    args: Vec<String>,

    /// Working directory (defaults to current directory)
    current_dir: Option<PathBuf>,

    /// Explicit environment; replaces the inherited one when set
    env: Option<ProcessEnvironment>,

    /// Prefix launching the program (e.g. `cmd /c` for batch files)
    launcher: &'static [&'static str],

    /// Whether to capture output (true) or inherit stdio (false)
    capture_output: bool,

    /// Maximum duration to wait for completion
    timeout_duration: Option<Duration>,

    /// Stage name used in log messages
    context: Option<String>,
}

impl ToolCommand {
    /// Creates a builder for `program` with default settings.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
            env: None,
            launcher: &[],
            capture_output: true,
            timeout_duration: None,
            context: None,
        }
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the process with exactly this environment.
    pub fn environment(mut self, env: &ProcessEnvironment) -> Self {
        self.env = Some(env.clone());
        self
    }

    /// Launches through the OS command interpreter where batch wrappers need it.
    pub const fn launched_for(mut self, host_os: HostOs) -> Self {
        self.launcher = host_os.launcher();
        self
    }

    /// Lets the tool write straight to the terminal.
    ///
    /// Used for long-running fetches and builds so their progress and
    /// diagnostics reach the user verbatim and in real time. The resulting
    /// [`Outcome`] then has empty `stdout`/`stderr`.
    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Set a timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context for logging (usually the pipeline stage)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Program name as shown in messages.
    pub fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map_or_else(|| self.program.display().to_string(), |s| s.to_string_lossy().to_string())
    }

    /// Full command line, for logs and `--dry-run` style output.
    pub fn display_command(&self) -> String {
        let mut parts: Vec<String> = self.launcher.iter().map(|s| (*s).to_string()).collect();
        parts.push(self.program.display().to_string());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Runs the command to completion.
    ///
    /// # Errors
    ///
    /// - [`DepvendError::ToolNotFound`] if the program cannot be launched because it does not exist
    /// - [`DepvendError::ToolFailed`] (with no exit code) if the timeout elapses
    /// - any other spawn failure, with context
    pub async fn run(self) -> Result<Outcome> {
        let start = std::time::Instant::now();
        let command_line = self.display_command();
        let tool = self.tool_name();
        let ctx = self.context.clone().unwrap_or_else(|| tool.clone());

        let mut cmd = match self.launcher.split_first() {
            Some((first, rest)) => {
                let mut cmd = Command::new(first);
                cmd.args(rest);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.args(&self.args);

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        if let Some(ref env) = self.env {
            cmd.env_clear();
            for (key, value) in env.iter() {
                cmd.env(key, value);
            }
        }

        if self.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        cmd.kill_on_drop(true);

        tracing::debug!(target: "tool", "({}) Executing command: {}", ctx, command_line);

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result
            } else {
                tracing::warn!(
                    target: "tool",
                    "({}) Command timed out after {} seconds: {}",
                    ctx,
                    duration.as_secs(),
                    command_line
                );
                return Err(DepvendError::ToolFailed {
                    tool,
                    stage: ctx,
                    outcome: Outcome {
                        exit_code: None,
                        stdout: String::new(),
                        stderr: format!("timed out after {} seconds", duration.as_secs()),
                    },
                }
                .into());
            }
        } else {
            output_future.await
        };

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DepvendError::ToolNotFound {
                    tool,
                    searched: self
                        .current_dir
                        .as_ref()
                        .map_or_else(|| ".".to_string(), |d| d.display().to_string()),
                }
                .into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("Failed to execute {command_line}")));
            }
        };

        let outcome = Outcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if outcome.success() {
            if !outcome.stdout.trim().is_empty() {
                tracing::trace!(target: "tool", "({}) {}", ctx, outcome.stdout.trim());
            }
        } else {
            tracing::debug!(
                target: "tool",
                "({}) Command failed with exit code: {:?}",
                ctx,
                outcome.exit_code
            );
            let diagnostics = outcome.diagnostics();
            if !diagnostics.is_empty() {
                tracing::debug!(target: "tool", "({}) Error: {}", ctx, diagnostics);
            }
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(target: "tool::perf", "({}) {} took {:.2}s", ctx, tool, elapsed.as_secs_f64());
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(target: "tool::perf", "({}) {} took {}ms", ctx, tool, elapsed.as_millis());
        }

        Ok(outcome)
    }

    /// Runs the command and turns a non-zero exit into [`DepvendError::ToolFailed`].
    pub async fn run_success(self, stage: &str) -> Result<Outcome> {
        let tool = self.tool_name();
        let outcome = self.run().await?;
        if outcome.success() {
            Ok(outcome)
        } else {
            Err(DepvendError::ToolFailed {
                tool,
                stage: stage.to_string(),
                outcome,
            }
            .into())
        }
    }
}
