//! File system helpers for the vendor tree and artifact placement.
//!
//! Every failure is reported as a [`DepvendError::FilesystemError`] naming
//! the operation and path, so a half-finished reconcile tells the user
//! exactly where it stopped.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::DepvendError;

/// Creates a directory and all its parents if they don't exist.
///
/// # Errors
///
/// Fails if the path exists but is not a directory, or cannot be created.
///
/// ```rust
/// use depvend_cli::utils::fs::ensure_dir;
///
/// # fn example() -> anyhow::Result<()> {
/// let temp = tempfile::tempdir()?;
/// ensure_dir(&temp.path().join("deps/linux_x86_64"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(DepvendError::FilesystemError {
            operation: "create directory".to_string(),
            path: path.display().to_string(),
            reason: "path exists but is not a directory".to_string(),
        }
        .into());
    }
    fs::create_dir_all(path)
        .map_err(|e| DepvendError::filesystem("create directory", path, &e).into())
}

/// Writes a string to a file atomically.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// Parent directories are created as needed. Readers see either the old
/// content or the new content, never a partial write.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| DepvendError::filesystem("create temporary file", &temp_path, &e))?;
        file.write_all(content)
            .map_err(|e| DepvendError::filesystem("write temporary file", &temp_path, &e))?;
        file.sync_all().map_err(|e| DepvendError::filesystem("sync file", &temp_path, &e))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| DepvendError::filesystem("rename temporary file", path, &e).into())
}

/// Recursively copies `src` into `dst`, overwriting files that already exist.
///
/// Files present in `dst` but not in `src` are left alone. Symlinks and
/// special files are skipped. Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    ensure_dir(dst)?;
    let mut copied = 0;

    let entries = fs::read_dir(src).map_err(|e| DepvendError::filesystem("read directory", src, &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DepvendError::filesystem("read directory", src, &e))?;
        let file_type =
            entry.file_type().map_err(|e| DepvendError::filesystem("stat", &entry.path(), &e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copied += copy_dir(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            copy_file(&src_path, &dst_path)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copies one file, replacing the destination.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| DepvendError::FilesystemError {
        operation: format!("copy from {}", src.display()),
        path: dst.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Removes a file; a file that is already gone is not an error.
pub fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DepvendError::filesystem("delete file", path, &e).into()),
    }
}

/// Recursively removes a directory; a directory that is already gone is not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DepvendError::filesystem("delete directory", path, &e).into()),
    }
}

/// Immediate subdirectories of `dir`, sorted by name.
///
/// A missing directory has no subdirectories.
pub fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| DepvendError::filesystem("read directory", dir, &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DepvendError::filesystem("read directory", dir, &e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| DepvendError::filesystem("stat", &entry.path(), &e))?
            .is_dir();
        if is_dir {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// SHA-256 of a file as lowercase hex.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| DepvendError::filesystem("open file", path, &e))?;

    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| DepvendError::filesystem("read file", path, &e))?;
    Ok(hex::encode(hasher.finalize()))
}
