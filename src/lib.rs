//! depvend - build and vendor-synchronization pipeline for an embedded V8
//!
//! A Go binding that links V8 statically needs three things kept in step with
//! each other: a pinned engine version, a prebuilt monolithic library per
//! platform, and a vendored copy of the engine's public headers that the Go
//! toolchain will actually vendor. depvend automates all three.
//!
//! # Architecture Overview
//!
//! ```text
//! version check -> checkout / sync / patch -> configure -> compile -> place -> reconcile
//! ```
//!
//! Stages run strictly in sequence and any failure aborts the rest. The
//! upgrade flow rewrites the pin file last, so an interrupted upgrade is
//! simply retried on the next run.
//!
//! # Core Modules
//!
//! ## Pipeline
//! - [`pipeline`] - stage orchestration and the upgrade flow
//! - [`version`] - pin file and release-feed drift detection
//! - [`source`] - source sync, checkout and the Windows patch sequence
//! - [`build`] - build-argument derivation, compile driver, artifact placement
//! - [`vendor`] - vendored header reconciliation, placeholders and manifest
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`config`] - project layout and `depvend.toml`
//! - [`core`] - error taxonomy and user-facing error display
//! - [`git`] - git operations through the system `git`
//! - [`lock`] - cross-process pipeline lock
//! - [`platform`] - platform key and host-OS differences
//! - [`process`] - external tool invocation and tool lookup
//! - [`utils`] - filesystem helpers and progress output
//!
//! # Project Layout
//!
//! ```text
//! <root>/
//! ├── cgo.go                  # generated vendor manifest
//! └── deps/
//!     ├── v8_version          # pinned version, no trailing newline
//!     ├── depot_tools/        # prepended to PATH for every tool
//!     ├── v8/                 # source checkout
//!     ├── include/            # vendored headers + placeholder packages
//!     ├── darwin_arm64/       # placed libv8.a per platform
//!     └── .build/<os>_<arch>/ # build output
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Exit 0 when a newer stable release exists, 1 when up to date
//! depvend check
//!
//! # Fetch sources, build for arm64 in debug mode
//! depvend sync
//! depvend build --arch arm64 --debug
//!
//! # Upgrade and re-vendor headers
//! depvend upgrade
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod git;
pub mod lock;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod source;
pub mod utils;
pub mod vendor;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
