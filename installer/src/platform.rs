//! Supported operating systems and architectures.
//!
//! Go publishes archives for many platforms but this installer only knows
//! how to wire up `PATH` on Linux (system A) and macOS (system B). The
//! names used here are the ones that appear in go.dev archive filenames.

use crate::error::{InstallerError, Result};
use std::fmt;

/// The operating-system families the installer supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// Linux-like systems using `/etc/profile.d` and `~/.profile`.
    Linux,
    /// macOS using `/etc/paths.d` and Z shell profiles.
    Darwin,
}

impl OsFamily {
    /// The name used in archive filenames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
        }
    }

    const SUPPORTED: &'static [&'static str] = &["linux", "darwin"];

    /// Parse an OS name, accepting Rust's `macos` as an alias.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] for any other name.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::Darwin),
            other => Err(InstallerError::UnsupportedPlatform {
                kind: "OS",
                value: other.to_owned(),
                expected: Self::SUPPORTED.join(", "),
            }),
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The CPU architectures the installer supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86.
    Amd64,
    /// 64-bit ARM.
    Arm64,
    /// 32-bit x86.
    I386,
}

impl Arch {
    /// The name used in archive filenames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::I386 => "386",
        }
    }

    const SUPPORTED: &'static [&'static str] = &["amd64", "arm64", "386"];

    /// Parse an architecture name.
    ///
    /// `x86_64` and `aarch64` are aliases for `amd64` and `arm64`; Rust's
    /// `x86` maps to `386`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] for any other name.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "amd64" | "x86_64" => Ok(Self::Amd64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "386" | "x86" => Ok(Self::I386),
            other => Err(InstallerError::UnsupportedPlatform {
                kind: "arch",
                value: other.to_owned(),
                expected: Self::SUPPORTED.join(", "),
            }),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated OS/architecture pair.
///
/// # Examples
///
/// ```
/// use go_installer::platform::Platform;
///
/// let platform = Platform::resolve("linux", "x86_64").expect("supported");
/// assert_eq!(platform.to_string(), "linux/amd64");
/// assert_eq!(
///     platform.archive_name("go1.25.1"),
///     "go1.25.1.linux-amd64.tar.gz"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Operating-system family.
    pub os: OsFamily,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Validate an OS/architecture pair against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] naming the first
    /// rejected component.
    pub fn resolve(os: &str, arch: &str) -> Result<Self> {
        Ok(Self {
            os: OsFamily::parse(os)?,
            arch: Arch::parse(arch)?,
        })
    }

    /// Archive filename published on go.dev for `version`.
    #[must_use]
    pub fn archive_name(&self, version: &str) -> String {
        format!("{version}.{}-{}.tar.gz", self.os, self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
