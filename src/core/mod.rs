//! Core types shared by every pipeline stage.
//!
//! Currently this is the error taxonomy: [`DepvendError`] for typed
//! stage failures, [`ErrorContext`] for presenting them on the CLI, and
//! [`user_friendly_error`] / [`exit_code`] for the binary's top-level handler.

pub mod error;

pub use error::{DepvendError, ErrorContext, exit_code, find_depvend_error, user_friendly_error};
