//! System-wide `PATH` registration.
//!
//! Linux systems source every script in `/etc/profile.d`; macOS merges
//! every file in `/etc/paths.d` into the default `PATH`. The installer
//! writes a drop-in there first and, if that fails, appends an export line
//! to the global profile instead.
//!
//! Content is staged in an unprivileged temporary file and only placed
//! with root privileges. The staging file is removed when the installer
//! returns, whichever phase succeeded.

use crate::error::{InstallerError, Result};
use crate::platform::OsFamily;
use crate::privilege::PrivilegedExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use std::io::Write;

/// Where system-wide `PATH` entries go on one OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemPathTargets {
    /// Drop-in file written by the primary strategy.
    pub drop_in: &'static str,
    /// Global profile appended to by the fallback strategy.
    pub fallback_profile: &'static str,
}

impl SystemPathTargets {
    /// Targets for `os`.
    #[must_use]
    pub fn for_os(os: OsFamily) -> Self {
        match os {
            OsFamily::Linux => Self {
                drop_in: "/etc/profile.d/golang-path.sh",
                fallback_profile: "/etc/profile",
            },
            OsFamily::Darwin => Self {
                drop_in: "/etc/paths.d/go",
                fallback_profile: "/etc/zprofile",
            },
        }
    }
}

/// Which strategy registered the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemPathOutcome {
    /// The drop-in file was installed.
    DropIn(Utf8PathBuf),
    /// The export line was appended to the global profile.
    AppendedToProfile(Utf8PathBuf),
}

/// Registers the toolchain bin directory system-wide.
pub struct SystemPathInstaller<'a> {
    privileged: &'a PrivilegedExecutor<'a>,
    os: OsFamily,
    bin_dir: &'a Utf8Path,
    targets: SystemPathTargets,
}

impl<'a> SystemPathInstaller<'a> {
    /// Create an installer for `os` that exposes `bin_dir`.
    #[must_use]
    pub fn new(privileged: &'a PrivilegedExecutor<'a>, os: OsFamily, bin_dir: &'a Utf8Path) -> Self {
        Self {
            privileged,
            os,
            bin_dir,
            targets: SystemPathTargets::for_os(os),
        }
    }

    /// Install the drop-in, falling back to appending to the global profile.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Io`] if the staging file cannot be written,
    /// or the fallback's [`InstallerError::Privilege`] or
    /// [`InstallerError::Exec`] error when both strategies fail.
    pub fn install(&self) -> Result<SystemPathOutcome> {
        let staged = self.stage(&self.drop_in_content())?;
        let staged_path = staged.path().to_str().ok_or_else(|| {
            InstallerError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "staging path is not valid UTF-8",
            ))
        })?;

        let drop_in = self.targets.drop_in;
        match self
            .privileged
            .run("install", &["-m", "0644", staged_path, drop_in])
        {
            Ok(()) => {
                info!("installed system PATH entry at {drop_in}");
                return Ok(SystemPathOutcome::DropIn(Utf8PathBuf::from(drop_in)));
            }
            Err(err) => warn!("could not install {drop_in}: {err}; appending to profile instead"),
        }

        let profile = self.targets.fallback_profile;
        let script = append_script(&self.fallback_content(), profile);
        self.privileged.run("sh", &["-c", &script])?;
        info!("appended system PATH entry to {profile}");
        Ok(SystemPathOutcome::AppendedToProfile(Utf8PathBuf::from(
            profile,
        )))
    }

    /// Drop-in file content for this OS.
    #[must_use]
    pub fn drop_in_content(&self) -> String {
        match self.os {
            OsFamily::Linux => format!(
                "# {}\n# Added by go-installer\n{}\n",
                self.targets.drop_in,
                self.quoted_export()
            ),
            OsFamily::Darwin => format!("{}\n", self.bin_dir),
        }
    }

    /// Text appended to the global profile by the fallback.
    #[must_use]
    pub fn fallback_content(&self) -> String {
        match self.os {
            OsFamily::Linux => self.drop_in_content(),
            OsFamily::Darwin => format!("{}\n", self.quoted_export()),
        }
    }

    fn quoted_export(&self) -> String {
        format!("export PATH=\"$PATH:{}\"", self.bin_dir)
    }

    fn stage(&self, content: &str) -> Result<tempfile::NamedTempFile> {
        let suffix = match self.os {
            OsFamily::Linux => ".sh",
            OsFamily::Darwin => ".txt",
        };
        let mut staged = tempfile::Builder::new()
            .prefix("golang-path-")
            .suffix(suffix)
            .tempfile()?;
        staged.write_all(content.as_bytes())?;
        staged.flush()?;
        Ok(staged)
    }
}

/// Quote `value` for a POSIX shell, escaping embedded single quotes.
///
/// # Examples
///
/// ```
/// use go_installer::system_path::shell_quote;
///
/// assert_eq!(shell_quote("it's"), r"'it'\''s'");
/// ```
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Build a `sh -c` script that appends `content` verbatim to `target`.
fn append_script(content: &str, target: &str) -> String {
    format!(
        "printf '%s' {} >> {}",
        shell_quote(content),
        shell_quote(target)
    )
}
