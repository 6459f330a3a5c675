//! Version oracle: the local pin versus the release feed.
//!
//! The pin is a plain-text file holding exactly one version string. The feed
//! is a JSON array whose first element carries
//! `versions[0].<engine>_version`. Drift is literal string inequality; a
//! downgrade upstream counts as drift too.
//!
//! Nothing here retries. A failed feed request is reported and the caller
//! re-runs the tool.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::FeedSettings;
use crate::constants::FEED_REQUEST_TIMEOUT;
use crate::core::DepvendError;
use crate::utils::fs::safe_write;

/// Outcome of comparing the pin with the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftResult {
    /// Pinned version
    pub current: String,
    /// Latest stable version from the feed
    pub latest: String,
    /// `current != latest`
    pub drifted: bool,
}

impl DriftResult {
    /// Compares two versions literally.
    pub fn new(current: impl Into<String>, latest: impl Into<String>) -> Self {
        let current = current.into();
        let latest = latest.into();
        let drifted = current != latest;
        Self {
            current,
            latest,
            drifted,
        }
    }
}

/// Reads the pinned version.
///
/// # Errors
///
/// [`DepvendError::ConfigurationError`] if the file is missing, unreadable or empty.
pub fn read_pin(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| DepvendError::ConfigurationError {
        message: format!("cannot read pin file {}: {e}", path.display()),
    })?;
    let version = content.trim();
    if version.is_empty() {
        return Err(DepvendError::ConfigurationError {
            message: format!("pin file {} is empty", path.display()),
        }
        .into());
    }
    Ok(version.to_string())
}

/// Writes the pinned version, with no trailing newline.
pub fn write_pin(path: &Path, version: &str) -> Result<()> {
    safe_write(path, version)?;
    tracing::info!(target: "version", "Pinned {} in {}", version, path.display());
    Ok(())
}

/// Extracts `[0].versions[0].<engine>_version` from a feed response.
///
/// ```rust
/// use depvend_cli::version::parse_latest_version;
///
/// let body = r#"[{"os": "linux", "versions": [{"v8_version": "9.1.269.36"}]}]"#;
/// assert_eq!(parse_latest_version(body, "v8").unwrap(), "9.1.269.36");
/// ```
///
/// # Errors
///
/// [`DepvendError::ParseError`] if the body is not JSON or lacks the field.
pub fn parse_latest_version(body: &str, engine: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| DepvendError::ParseError {
        source_name: "release feed".to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;

    let field = format!("{engine}_version");
    let pointer = format!("/0/versions/0/{field}");
    match value.pointer(&pointer).and_then(serde_json::Value::as_str) {
        Some(version) if !version.trim().is_empty() => Ok(version.trim().to_string()),
        _ => Err(DepvendError::ParseError {
            source_name: "release feed".to_string(),
            reason: format!("expected a string at [0].versions[0].{field}"),
        }
        .into()),
    }
}

/// Where the feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// HTTP(S) endpoint
    Http(String),
    /// Local JSON file, for mirrors and offline runs (`file://` URLs)
    File(PathBuf),
}

impl FeedSource {
    /// Picks the source kind from a URL.
    pub fn from_url(url: &str) -> Self {
        url.strip_prefix("file://")
            .map_or_else(|| Self::Http(url.to_string()), |path| Self::File(PathBuf::from(path)))
    }

    /// Fetches the raw feed body.
    ///
    /// # Errors
    ///
    /// [`DepvendError::NetworkError`] on transport failure or a non-success status.
    pub async fn fetch(&self) -> Result<String> {
        match self {
            Self::Http(url) => fetch_http(url).await,
            Self::File(path) => {
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    DepvendError::NetworkError {
                        operation: format!("reading release feed {}", path.display()),
                        reason: e.to_string(),
                    }
                    .into()
                })
            }
        }
    }
}

async fn fetch_http(url: &str) -> Result<String> {
    let network_error = |reason: String| DepvendError::NetworkError {
        operation: format!("fetching release feed {url}"),
        reason,
    };

    tracing::debug!(target: "version", "Fetching release feed from {}", url);
    let client = reqwest::Client::builder()
        .timeout(FEED_REQUEST_TIMEOUT)
        .user_agent(concat!("depvend/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| network_error(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| network_error(e.to_string()))?;
    if !response.status().is_success() {
        return Err(network_error(format!("HTTP {}", response.status())).into());
    }
    response.text().await.map_err(|e| network_error(e.to_string()).into())
}

/// Latest stable version according to `feed`.
pub async fn latest_version(feed: &FeedSettings) -> Result<String> {
    let body = FeedSource::from_url(&feed.url).fetch().await?;
    let latest = parse_latest_version(&body, &feed.engine)?;
    tracing::debug!(target: "version", "Latest stable {} is {}", feed.engine, latest);
    Ok(latest)
}

/// Reads the pin, asks the feed and compares.
pub async fn check_drift(pin_file: &Path, feed: &FeedSettings) -> Result<DriftResult> {
    let current = read_pin(pin_file)?;
    let latest = latest_version(feed).await?;
    let result = DriftResult::new(current, latest);
    if result.drifted {
        tracing::info!(target: "version", "Pinned {} differs from latest {}", result.current, result.latest);
    } else {
        tracing::info!(target: "version", "Pinned {} is the latest", result.current);
    }
    Ok(result)
}
