//! Building the monolithic static library.
//!
//! - [`config`] - pure derivation of the generator's argument string
//! - [`driver`] - `gn gen` then `ninja` into a platform-keyed output directory
//! - [`artifact`] - copying the result to `<deps>/<os>_<arch>/`

pub mod artifact;
pub mod config;
pub mod driver;

pub use artifact::{PlacedArtifact, artifact_path, place};
pub use config::{BuildConfig, BuildRequest, GnValue, configure, render_args};
pub use driver::BuildDriver;
