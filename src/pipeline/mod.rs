//! Stage orchestration.
//!
//! A [`Pipeline`] owns everything one run needs (configuration, platform
//! key, process environment) and runs the stages strictly in sequence:
//!
//! ```text
//! version check -> checkout / sync / patch -> configure -> compile -> place -> reconcile
//! ```
//!
//! Every failure aborts the remaining stages. Mutating operations hold the
//! pipeline lock for their whole duration.

use anyhow::Result;
use serde::Serialize;

use crate::build::{BuildConfig, BuildDriver, BuildRequest, PlacedArtifact, place};
use crate::config::PipelineConfig;
use crate::constants::PIPELINE_LOCK_NAME;
use crate::lock::PipelineLock;
use crate::platform::PlatformKey;
use crate::process::ProcessEnvironment;
use crate::source::SourceSync;
use crate::utils::progress::ProgressMode;
use crate::vendor::{ReconcileOptions, ReconcilePlan, ReconcileReport, Reconciler};
use crate::version::{DriftResult, check_drift, write_pin};

/// Switches for [`Pipeline::upgrade`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpgradeOptions {
    /// Upgrade even when the pin matches the feed
    pub force: bool,
    /// Report the plan without changing anything
    pub dry_run: bool,
    /// Prune stale vendored directories
    pub prune: bool,
}

/// What [`Pipeline::upgrade`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpgradeOutcome {
    /// Pin already matches the feed
    UpToDate {
        /// Drift check result
        drift: DriftResult,
    },
    /// Dry run: what would be done
    Planned {
        /// Drift check result
        drift: DriftResult,
        /// Reconcile plan against the current checkout, if it exists
        plan: Option<ReconcilePlan>,
    },
    /// Checkout moved, tree reconciled and pin rewritten
    Upgraded {
        /// Drift check result
        drift: DriftResult,
        /// Reconcile report
        report: ReconcileReport,
    },
}

/// One pipeline run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    platform: PlatformKey,
    env: ProcessEnvironment,
    progress: ProgressMode,
}

impl Pipeline {
    /// Creates a run using a copy of the ambient environment with the tools
    /// directory prepended to `PATH`.
    pub fn new(config: PipelineConfig, platform: PlatformKey, progress: ProgressMode) -> Self {
        let env = ProcessEnvironment::from_ambient(platform.host_os()).with_prepended_path(&config.tools_dir);
        Self::with_environment(config, platform, env, progress)
    }

    /// Creates a run with an explicit process environment.
    pub const fn with_environment(
        config: PipelineConfig,
        platform: PlatformKey,
        env: ProcessEnvironment,
        progress: ProgressMode,
    ) -> Self {
        Self {
            config,
            platform,
            env,
            progress,
        }
    }

    /// Resolved configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Platform of this run.
    pub const fn platform(&self) -> &PlatformKey {
        &self.platform
    }

    async fn lock(&self) -> Result<PipelineLock> {
        PipelineLock::acquire(&self.config.locks_dir(), PIPELINE_LOCK_NAME, self.config.lock_timeout)
            .await
    }

    /// Compares the pin with the feed. Read-only; takes no lock.
    pub async fn check(&self) -> Result<DriftResult> {
        let spinner = self.progress.spinner("Checking latest stable version");
        let result = check_drift(&self.config.pin_file, &self.config.feed).await;
        spinner.finish_and_clear();
        result
    }

    /// Syncs the source tree to `revision`, or to whatever the checkout
    /// tracks, and patches it on Windows.
    pub async fn sync(&self, revision: Option<&str>) -> Result<()> {
        let _lock = self.lock().await?;
        self.progress.stage_header("sync", revision.unwrap_or(&self.config.solution.name));
        SourceSync::new(&self.config, &self.platform, &self.env).sync(revision).await
    }

    /// Derived build configuration for `request`.
    pub fn build_config(&self, request: BuildRequest) -> BuildConfig {
        BuildConfig::from_request(request).with_embedder_string(self.config.build.embedder_string.clone())
    }

    /// Configures, compiles and places the library for `request.arch`.
    pub async fn build(&self, request: BuildRequest) -> Result<PlacedArtifact> {
        let _lock = self.lock().await?;
        let target = self.platform.with_arch(request.arch);
        let build = self.build_config(request);

        self.progress.stage_header("build", &target.dir_name());
        let artifact = BuildDriver::new(&self.config, &self.env).build(&build, &target).await?;
        place(&artifact, &self.config.deps_dir, &target)
    }

    /// Reconciles the vendored include tree.
    pub async fn vendor(&self, options: ReconcileOptions) -> Result<ReconcileReport> {
        let _lock = self.lock().await?;
        self.reconcile(options)
    }

    fn reconcile(&self, options: ReconcileOptions) -> Result<ReconcileReport> {
        let spinner = self.progress.spinner("Reconciling vendored headers");
        let result = Reconciler::from_config(&self.config).and_then(|r| r.reconcile(options));
        match &result {
            Ok(report) => spinner.finish_with_message(format!(
                "Vendored {} directories",
                report.manifest_dirs.len()
            )),
            Err(_) => spinner.finish_and_clear(),
        }
        result
    }

    /// Moves to the latest stable version when the pin has drifted.
    ///
    /// Order: drift check, checkout, reconcile, then the pin. The pin is only
    /// rewritten after everything else succeeded, so a failed upgrade is
    /// retried in full on the next run.
    pub async fn upgrade(&self, options: UpgradeOptions) -> Result<UpgradeOutcome> {
        let drift = self.check().await?;
        if !drift.drifted && !options.force {
            return Ok(UpgradeOutcome::UpToDate {
                drift,
            });
        }

        if options.dry_run {
            let plan = if self.config.source_include_dir.is_dir() {
                Some(Reconciler::from_config(&self.config)?.plan()?)
            } else {
                None
            };
            return Ok(UpgradeOutcome::Planned {
                drift,
                plan,
            });
        }

        let _lock = self.lock().await?;
        self.progress.stage_header("checkout", &drift.latest);
        SourceSync::new(&self.config, &self.platform, &self.env).checkout(&drift.latest).await?;

        let report = self.reconcile(ReconcileOptions {
            prune: options.prune,
        })?;
        write_pin(&self.config.pin_file, &drift.latest)?;

        Ok(UpgradeOutcome::Upgraded {
            drift,
            report,
        })
    }
}
