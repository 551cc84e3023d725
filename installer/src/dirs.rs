//! Directory resolution abstraction for platform-specific paths.
//!
//! Profile updates need the user's home directory. Going through a trait
//! lets tests point the installer at a temporary directory.

use camino::Utf8PathBuf;

/// Provides the base directories the installer writes to.
pub trait BaseDirs {
    /// The current user's home directory, if it can be determined and is
    /// valid UTF-8.
    fn home_dir(&self) -> Option<Utf8PathBuf>;
}

/// Resolves directories using `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<Utf8PathBuf> {
        directories_next::BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::try_from(dirs.home_dir().to_path_buf()).ok())
    }
}

/// Fixed directories, used when the caller already knows the home directory.
#[derive(Debug, Clone, Default)]
pub struct FixedBaseDirs {
    home: Option<Utf8PathBuf>,
}

impl FixedBaseDirs {
    /// Use `home` as the home directory.
    #[must_use]
    pub fn new(home: Option<Utf8PathBuf>) -> Self {
        Self { home }
    }
}

impl BaseDirs for FixedBaseDirs {
    fn home_dir(&self) -> Option<Utf8PathBuf> {
        self.home.clone()
    }
}
