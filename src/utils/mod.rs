//! File system and terminal helpers shared by the pipeline stages.
//!
//! - [`fs`] - directory creation, overlay copies, atomic writes and checksums
//! - [`progress`] - spinners and stage headers

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, copy_dir, ensure_dir, safe_write};
pub use progress::ProgressMode;
