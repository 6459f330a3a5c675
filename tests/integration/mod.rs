//! Integration test suite for depvend
//!
//! End-to-end tests that drive the `depvend` binary and the library API
//! against temporary project roots. External tools (the fetch toolkit, git,
//! the build generator) are replaced by small shell scripts in the project's
//! tools directory, so these tests need no network and no real toolchain.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **build**: `depvend build` argument derivation and the fake build flow
//! - **check**: drift detection and its exit codes
//! - **reconcile**: vendored tree reconciliation scenarios
//! - **sync**: `depvend sync` revisions and the solution dry run
//! - **upgrade**: the full upgrade flow and its failure ordering
//! - **vendor**: `depvend vendor` from the command line

mod build;
mod check;
mod reconcile;
mod sync;
mod upgrade;
mod vendor;

use assert_cmd::Command;
use std::path::Path;

/// The `depvend` binary rooted at `root`, with progress output off.
pub fn depvend(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("depvend").unwrap();
    cmd.arg("--root")
        .arg(root)
        .arg("--no-progress")
        .env_remove("DEPVEND_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}
