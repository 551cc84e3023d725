//! Idempotent `PATH` updates to the user's shell profile.
//!
//! The writer appends a short, self-identifying block to the first profile
//! file that exists, unless some candidate already exports the toolchain
//! directory. "Already exports" is loose: any line mentioning
//! both the bin directory and `export PATH` counts, so a differently ordered
//! export written by hand or by another tool is not duplicated.
//!
//! The loose rule can also match an unrelated comment that happens to
//! mention both strings. That false positive is accepted.

use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use crate::platform::OsFamily;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};

/// Keyword that marks a line as a `PATH` export.
const PATH_EXPORT_KEYWORD: &str = "export PATH";

/// Comment written above every appended line.
pub const ATTRIBUTION_COMMENT: &str = "# Added by go-installer to expose Go binaries";

/// Profile filenames, relative to the home directory, in priority order.
#[must_use]
pub fn profile_candidates(os: OsFamily) -> &'static [&'static str] {
    match os {
        OsFamily::Linux => &[".profile"],
        OsFamily::Darwin => &[".zprofile", ".zshrc", ".bash_profile", ".profile"],
    }
}

/// Resolve the candidate profile paths for `os` under the home directory.
///
/// # Errors
///
/// Returns [`InstallerError::HomeDirectory`] when no home directory is known.
pub fn home_profile_paths(dirs: &dyn BaseDirs, os: OsFamily) -> Result<Vec<Utf8PathBuf>> {
    let home = dirs.home_dir().ok_or(InstallerError::HomeDirectory)?;
    Ok(profile_candidates(os)
        .iter()
        .map(|name| home.join(name))
        .collect())
}

/// What [`ProfileLineWriter::ensure`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// A candidate already exported the directory; nothing was written.
    AlreadyPresent(Utf8PathBuf),
    /// The block was appended to an existing file.
    Appended(Utf8PathBuf),
    /// No candidate existed, so the first one was created.
    Created(Utf8PathBuf),
}

impl ProfileOutcome {
    /// The profile file that satisfies the requirement.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::AlreadyPresent(path) | Self::Appended(path) | Self::Created(path) => path,
        }
    }

    /// Whether a file was modified.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyPresent(_))
    }
}

/// Ensures a `PATH` export line is present in one of a set of profile files.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use go_installer::profile::{ProfileLineWriter, ProfileOutcome};
///
/// let temp = tempfile::tempdir()?;
/// let home = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8");
/// let writer = ProfileLineWriter::new("/usr/local/go/bin", "export PATH=$PATH:/usr/local/go/bin");
///
/// let first = writer.ensure(&[home.join(".profile")])?;
/// assert!(matches!(first, ProfileOutcome::Created(_)));
///
/// let second = writer.ensure(&[home.join(".profile")])?;
/// assert!(matches!(second, ProfileOutcome::AlreadyPresent(_)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProfileLineWriter {
    bin_dir: String,
    line: String,
}

impl ProfileLineWriter {
    /// Create a writer that ensures `line`, treating any export that
    /// mentions `bin_dir` as equivalent.
    pub fn new(bin_dir: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            line: line.into(),
        }
    }

    /// Ensure one of `candidates` exports the directory.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ProfileUpdate`] when a profile file cannot
    /// be read, opened, or written.
    pub fn ensure(&self, candidates: &[Utf8PathBuf]) -> Result<ProfileOutcome> {
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            let bytes = std::fs::read(path).map_err(|source| InstallerError::ProfileUpdate {
                path: path.clone(),
                source,
            })?;
            let content = String::from_utf8_lossy(&bytes);
            if satisfies_profile_line(&content, &self.line, &self.bin_dir) {
                info!("{path} already adds {} to PATH", self.bin_dir);
                return Ok(ProfileOutcome::AlreadyPresent(path.clone()));
            }
        }

        if let Some(existing) = candidates.iter().find(|path| path.is_file()) {
            self.append_block(existing, false)?;
            return Ok(ProfileOutcome::Appended(existing.clone()));
        }

        let Some(first) = candidates.first() else {
            return Err(InstallerError::ProfileUpdate {
                path: Utf8PathBuf::new(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "no profile candidates",
                ),
            });
        };
        self.append_block(first, true)?;
        Ok(ProfileOutcome::Created(first.clone()))
    }

    fn append_block(&self, path: &Utf8Path, create: bool) -> Result<()> {
        debug!("appending PATH export to {path} (create: {create})");
        let to_error = |source| InstallerError::ProfileUpdate {
            path: path.to_owned(),
            source,
        };

        let file = OpenOptions::new()
            .append(true)
            .create(create)
            .open(path)
            .map_err(to_error)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer).map_err(to_error)?;
        writeln!(writer, "{ATTRIBUTION_COMMENT}").map_err(to_error)?;
        writeln!(writer, "{}", self.line).map_err(to_error)?;
        writer.flush().map_err(to_error)?;
        Ok(())
    }
}

/// Whether `content` already contains `line` or an equivalent export of
/// `bin_dir`.
///
/// Lines are compared after trimming surrounding whitespace.
///
/// # Examples
///
/// ```
/// use go_installer::profile::satisfies_profile_line;
///
/// let line = "export PATH=$PATH:/usr/local/go/bin";
/// assert!(satisfies_profile_line(
///     "export PATH=/usr/local/go/bin:$PATH\n",
///     line,
///     "/usr/local/go/bin",
/// ));
/// assert!(!satisfies_profile_line("export PATH=$PATH:/usr/local/bin\n", line, "/usr/local/go/bin"));
/// ```
#[must_use]
pub fn satisfies_profile_line(content: &str, line: &str, bin_dir: &str) -> bool {
    content.lines().map(str::trim).any(|candidate| {
        candidate == line
            || (candidate.contains(bin_dir) && candidate.contains(PATH_EXPORT_KEYWORD))
    })
}
