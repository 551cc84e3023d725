//! Release metadata and archive retrieval.
//!
//! Provides a trait-based abstraction over the Go download site so the
//! orchestrator can be exercised without network access.

use crate::version::{VERSION_PREFIX, VersionToken};
use log::debug;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Base URL of the Go download site.
const RELEASE_HOST: &str = "https://go.dev";

/// Timeout for the latest-version metadata request.
const METADATA_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound on how much of the metadata response is read.
const METADATA_LIMIT: u64 = 1024;

/// `User-Agent` sent with archive requests.
const USER_AGENT: &str = concat!("go-installer/", env!("CARGO_PKG_VERSION"));

/// Source of Go releases.
///
/// # Examples
///
/// ```
/// use go_installer::download::HttpReleaseSource;
///
/// let source = HttpReleaseSource;
/// // Use source.latest_version() in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseSource {
    /// Fetch the token of the latest stable release.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a
    /// version token.
    fn latest_version(&self) -> Result<VersionToken, DownloadError>;

    /// Download `archive_name` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or file write fails.
    fn download_archive(&self, archive_name: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from release downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed before a response was received.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {status} for {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The metadata response did not start with a version token.
    #[error("invalid version string {value:?}")]
    InvalidVersion {
        /// First line of the response.
        value: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based release source using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpReleaseSource;

impl HttpReleaseSource {
    /// URL of the plain-text latest-version endpoint.
    #[must_use]
    pub fn metadata_url() -> String {
        format!("{RELEASE_HOST}/VERSION?m=text")
    }

    /// URL of a release archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use go_installer::download::HttpReleaseSource;
    ///
    /// let url = HttpReleaseSource::archive_url("go1.25.1.linux-amd64.tar.gz");
    /// assert_eq!(url, "https://go.dev/dl/go1.25.1.linux-amd64.tar.gz");
    /// ```
    #[must_use]
    pub fn archive_url(archive_name: &str) -> String {
        format!("{RELEASE_HOST}/dl/{archive_name}")
    }
}

impl ReleaseSource for HttpReleaseSource {
    fn latest_version(&self) -> Result<VersionToken, DownloadError> {
        let url = Self::metadata_url();
        let response = metadata_agent()
            .get(&url)
            .call()
            .map_err(|e| map_ureq_error(&url, &e))?;

        let mut body = String::new();
        response
            .into_body()
            .as_reader()
            .take(METADATA_LIMIT)
            .read_to_string(&mut body)
            .map_err(|e| DownloadError::Http {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        parse_latest_version(&body)
    }

    fn download_archive(&self, archive_name: &str, dest: &Path) -> Result<(), DownloadError> {
        let url = Self::archive_url(archive_name);
        let result = download_to_file(&url, dest);
        if result.is_err() && dest.exists() {
            debug!("removing partial download {}", dest.display());
            if let Err(err) = std::fs::remove_file(dest) {
                debug!("failed to remove partial download: {err}");
            }
        }
        result
    }
}

/// Extract the version token from a metadata response body.
///
/// Only the first line counts; later lines carry the release timestamp.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidVersion`] when the first line is empty or
/// does not start with `go`.
///
/// # Examples
///
/// ```
/// use go_installer::download::parse_latest_version;
///
/// let token = parse_latest_version("go1.25.1\ntime 2025-08-27T15:49:40Z\n").unwrap();
/// assert_eq!(token.as_str(), "go1.25.1");
/// ```
pub fn parse_latest_version(body: &str) -> Result<VersionToken, DownloadError> {
    let first = body.lines().next().unwrap_or_default().trim();
    if !first.starts_with(VERSION_PREFIX) {
        return Err(DownloadError::InvalidVersion {
            value: first.to_owned(),
        });
    }
    VersionToken::normalize(first)
        .filter(|token| !token.is_minimal())
        .ok_or_else(|| DownloadError::InvalidVersion {
            value: first.to_owned(),
        })
}

/// Download a URL and stream the body into a file.
fn download_to_file(url: &str, dest: &Path) -> Result<(), DownloadError> {
    let response = archive_agent()
        .get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    let mut file = std::fs::File::create(dest)?;
    std::io::copy(&mut response.into_body().as_reader(), &mut file).map_err(DownloadError::Io)?;
    file.sync_all()?;
    Ok(())
}

/// Agent for the metadata request, bounded by [`METADATA_TIMEOUT`].
fn metadata_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(METADATA_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Agent for archive downloads. Transfers are unbounded in size, so no
/// global timeout applies.
fn archive_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder().timeout_global(None).build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
