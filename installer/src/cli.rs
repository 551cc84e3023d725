//! CLI argument definitions for the Go installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on wiring.

use crate::installer::{InstallRequest, default_download_dir};
use camino::Utf8PathBuf;
use clap::Parser;

/// Install or update the Go toolchain under /usr/local/go.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "go-installer")]
#[command(about)]
#[command(long_about = concat!(
    "Install or update the Go toolchain under /usr/local/go.\n\n",
    "The installer downloads the official release archive from go.dev, replaces ",
    "any previous installation (using sudo when not already root), and adds ",
    "/usr/local/go/bin to PATH in your shell profile. Re-running it is safe: an ",
    "up-to-date installation is left alone and profile lines are never duplicated.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the latest release:\n",
    "    $ go-installer\n\n",
    "  Install a specific release:\n",
    "    $ go-installer --version 1.25.1\n\n",
    "  Also expose Go system-wide:\n",
    "    $ go-installer --system\n\n",
    "  Preview without changing anything:\n",
    "    $ go-installer --dry-run",
))]
pub struct Cli {
    /// Go version to install, e.g. go1.25.1 [default: latest release].
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Only print the actions that would be taken.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not modify profile files to add the Go bin directory to PATH.
    #[arg(long)]
    pub no_path_update: bool,

    /// Also add the PATH entry system-wide (requires root). Ignored with
    /// `--no-path-update`.
    #[arg(long)]
    pub system: bool,

    /// Directory to place the downloaded archive [default: system temp dir].
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors and warnings still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Translate the flags into an [`InstallRequest`].
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use go_installer::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["go-installer", "--no-path-update"]);
    /// assert!(!cli.install_request().update_path);
    /// ```
    #[must_use]
    pub fn install_request(&self) -> InstallRequest {
        InstallRequest {
            version: self.version.clone(),
            dry_run: self.dry_run,
            update_path: !self.no_path_update,
            system_path: self.system,
            download_dir: self
                .download_dir
                .clone()
                .unwrap_or_else(default_download_dir),
            quiet: self.quiet,
        }
    }

    /// Default log filter directive for the requested verbosity.
    ///
    /// `RUST_LOG` takes precedence when set.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
