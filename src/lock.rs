//! Cross-process lock around the deps directory.
//!
//! Two pipeline runs against the same project would race on the checkout,
//! the build output and the vendored tree. Every mutating command holds a
//! [`PipelineLock`] for its whole duration.
//!
//! File operations run on `spawn_blocking` so waiting never stalls the
//! runtime.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::DepvendError;

/// An exclusive lock held until dropped.
///
/// The lock file lives at `<locks_dir>/<name>.lock` and is left in place on
/// release, so every waiter contends on the same file.
///
/// ```rust,no_run
/// use depvend_cli::lock::PipelineLock;
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let _lock = PipelineLock::acquire(Path::new("deps/.locks"), "pipeline", Duration::from_secs(120)).await?;
/// // sync, build, reconcile...
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PipelineLock {
    _file: Arc<File>,
    name: String,
    path: PathBuf,
}

impl Drop for PipelineLock {
    fn drop(&mut self) {
        debug!(lock_name = %self.name, "Pipeline lock released");
    }
}

impl PipelineLock {
    /// Acquires the lock `name`, polling with exponential backoff until `timeout`.
    ///
    /// # Errors
    ///
    /// [`DepvendError::LockTimeout`] if another process still holds the lock
    /// when `timeout` elapses.
    pub async fn acquire(locks_dir: &Path, name: &str, timeout: Duration) -> Result<Self> {
        debug!(lock_name = %name, "Waiting for pipeline lock");

        tokio::fs::create_dir_all(locks_dir).await.map_err(|e| {
            DepvendError::filesystem("create locks directory", locks_dir, &e)
        })?;
        let path = locks_dir.join(format!("{name}.lock"));

        let open_path = path.clone();
        let file = tokio::task::spawn_blocking(move || {
            OpenOptions::new().create(true).write(true).truncate(false).open(&open_path)
        })
        .await
        .context("spawn_blocking panicked")?
        .map_err(|e| DepvendError::filesystem("open lock file", &path, &e))?;
        let file = Arc::new(file);

        let start = std::time::Instant::now();
        let backoff = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS));

        for delay in backoff {
            let attempt = Arc::clone(&file);
            let locked = tokio::task::spawn_blocking(move || attempt.try_lock_exclusive())
                .await
                .context("spawn_blocking panicked")?;

            if let Ok(true) = locked {
                debug!(
                    lock_name = %name,
                    wait_ms = start.elapsed().as_millis(),
                    "Pipeline lock acquired"
                );
                return Ok(Self {
                    _file: file,
                    name: name.to_string(),
                    path,
                });
            }

            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(delay.min(remaining)).await;
        }

        Err(DepvendError::LockTimeout {
            name: name.to_string(),
            seconds: timeout.as_secs(),
        }
        .into())
    }

    /// Lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
