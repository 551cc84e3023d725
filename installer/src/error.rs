//! Error types for the Go installer.
//!
//! Each variant corresponds to one failure kind the installer can surface.
//! Messages are written to be shown to the user verbatim, so they carry the
//! path, URL, or command involved and a recovery hint where one exists.

use camino::Utf8PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::download::DownloadError;

/// Errors that can occur during installation.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Fetching release metadata or an archive failed.
    #[error("network request to {url} failed: {reason}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// Description of the failure, including any HTTP status.
        reason: String,
    },

    /// The release metadata endpoint returned something that is not a version.
    #[error("invalid version string from release metadata: {value:?}")]
    InvalidLatestVersion {
        /// The offending first line of the response.
        value: String,
    },

    /// The requested version normalised to nothing usable.
    #[error("invalid version {input:?}; expected something like go1.25.1 or 1.25.1")]
    InvalidVersion {
        /// The raw user input.
        input: String,
    },

    /// The host operating system or architecture is not supported.
    #[error("unsupported {kind}: {value} (supported: {expected})")]
    UnsupportedPlatform {
        /// Either `"OS"` or `"arch"`.
        kind: &'static str,
        /// The rejected value.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },

    /// Root privileges are required but no escalation helper is available.
    #[error("{message}")]
    Privilege {
        /// Actionable description of what to do instead.
        message: String,
    },

    /// A subprocess ran but exited unsuccessfully.
    #[error("command `{command}` failed: {status}")]
    Exec {
        /// The command line that was run.
        command: String,
        /// The exit status reported by the process.
        status: ExitStatus,
    },

    /// No usable `go` binary could be found or parsed.
    #[error("no installed Go found")]
    VersionNotFound,

    /// The user's home directory could not be resolved.
    #[error("could not determine home directory")]
    HomeDirectory,

    /// A shell profile file could not be read or written.
    #[error("failed to update {path}: {source}")]
    ProfileUpdate {
        /// The profile file being read or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The downloaded archive does not look like a Go release.
    #[error("archive check failed: {0}")]
    Archive(#[from] ArchiveError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl From<DownloadError> for InstallerError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Http { url, reason } => Self::Network { url, reason },
            DownloadError::Status { url, status } => Self::Network {
                url,
                reason: format!("unexpected HTTP status {status}"),
            },
            DownloadError::InvalidVersion { value } => Self::InvalidLatestVersion { value },
            DownloadError::Io(source) => Self::Io(source),
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
