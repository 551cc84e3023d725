//! Filesystem locations managed by the installer.

use camino::{Utf8Path, Utf8PathBuf};

/// Where the Go toolchain lives once installed.
///
/// Archives from go.dev unpack into a single `go/` directory, so the
/// installation root is always `<parent>/go`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    parent: Utf8PathBuf,
}

impl Default for InstallLayout {
    /// The conventional `/usr/local/go` installation.
    fn default() -> Self {
        Self::new("/usr/local")
    }
}

impl InstallLayout {
    /// Create a layout that extracts into `parent`.
    #[must_use]
    pub fn new(parent: impl Into<Utf8PathBuf>) -> Self {
        Self {
            parent: parent.into(),
        }
    }

    /// Directory the archive is extracted into.
    #[must_use]
    pub fn parent(&self) -> &Utf8Path {
        &self.parent
    }

    /// Root of the installed toolchain (`<parent>/go`).
    #[must_use]
    pub fn root(&self) -> Utf8PathBuf {
        self.parent.join("go")
    }

    /// Directory holding the toolchain binaries.
    #[must_use]
    pub fn bin_dir(&self) -> Utf8PathBuf {
        self.root().join("bin")
    }

    /// Absolute path of the managed `go` binary.
    #[must_use]
    pub fn go_binary(&self) -> Utf8PathBuf {
        self.bin_dir().join("go")
    }

    /// The shell line that appends the bin directory to `PATH`.
    ///
    /// # Examples
    ///
    /// ```
    /// use go_installer::layout::InstallLayout;
    ///
    /// assert_eq!(
    ///     InstallLayout::default().path_export_line(),
    ///     "export PATH=$PATH:/usr/local/go/bin"
    /// );
    /// ```
    #[must_use]
    pub fn path_export_line(&self) -> String {
        format!("export PATH=$PATH:{}", self.bin_dir())
    }
}
