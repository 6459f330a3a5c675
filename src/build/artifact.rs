//! Placing the built library into its per-platform directory.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::constants::LIBRARY_ARTIFACT_NAME;
use crate::core::DepvendError;
use crate::platform::PlatformKey;
use crate::utils::fs::{calculate_checksum, copy_file, ensure_dir};

/// Where an artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedArtifact {
    /// `<deps>/<os>_<arch>/libv8.a`
    pub path: PathBuf,
    /// SHA-256 of the placed file
    pub sha256: String,
}

/// Final location of the library for `platform`.
pub fn artifact_path(deps_dir: &Path, platform: &PlatformKey) -> PathBuf {
    deps_dir.join(platform.dir_name()).join(LIBRARY_ARTIFACT_NAME)
}

/// Copies `artifact` to `<deps>/<os>_<arch>/libv8.a`, replacing any previous one.
pub fn place(artifact: &Path, deps_dir: &Path, platform: &PlatformKey) -> Result<PlacedArtifact> {
    if !artifact.is_file() {
        return Err(DepvendError::FilesystemError {
            operation: "place artifact".to_string(),
            path: artifact.display().to_string(),
            reason: "artifact does not exist".to_string(),
        }
        .into());
    }

    let destination = artifact_path(deps_dir, platform);
    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }
    copy_file(artifact, &destination)?;

    let sha256 = calculate_checksum(&destination)?;
    tracing::info!(target: "build", "Placed {} (sha256 {})", destination.display(), sha256);
    Ok(PlacedArtifact {
        path: destination,
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_place_creates_dir_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let deps = temp.path().join("deps");
        let built = temp.path().join("libv8_monolith.a");
        let platform = PlatformKey::new("darwin", "arm64");

        std::fs::write(&built, "first").unwrap();
        let placed = place(&built, &deps, &platform).unwrap();
        assert_eq!(placed.path, deps.join("darwin_arm64/libv8.a"));

        std::fs::write(&built, "second").unwrap();
        let again = place(&built, &deps, &platform).unwrap();
        assert_eq!(std::fs::read_to_string(&again.path).unwrap(), "second");
        assert_ne!(placed.sha256, again.sha256);
    }

    #[test]
    fn test_missing_artifact() {
        let temp = TempDir::new().unwrap();
        let err = place(
            &temp.path().join("nothing.a"),
            temp.path(),
            &PlatformKey::new("linux", "x86_64"),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DepvendError>(),
            Some(DepvendError::FilesystemError { .. })
        ));
    }
}
