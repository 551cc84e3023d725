//! Subprocess execution and command lookup.
//!
//! Every external program the installer runs goes through
//! [`CommandExecutor`], so tests can substitute a stub that records the
//! exact command sequence instead of touching the host.

use crate::error::{InstallerError, Result};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output, Stdio};

/// How a streamed command's standard input is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinMode {
    /// Standard input is closed.
    Closed,
    /// Standard input is inherited so the child can prompt the user.
    Interactive,
}

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command and returns its captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use go_installer::exec::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.output("go", &["version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), go_installer::error::InstallerError>(())
    /// ```
    fn output(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Runs a command with standard output and error streamed to the
    /// console and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    fn stream(&self, program: &str, args: &[&str], stdin: StdinMode) -> Result<ExitStatus>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn output(&self, program: &str, args: &[&str]) -> Result<Output> {
        log::debug!("capturing `{}`", describe_command(program, args));
        Command::new(program)
            .args(args)
            .output()
            .map_err(InstallerError::from)
    }

    fn stream(&self, program: &str, args: &[&str], stdin: StdinMode) -> Result<ExitStatus> {
        log::debug!("running `{}`", describe_command(program, args));
        let stdin = match stdin {
            StdinMode::Closed => Stdio::null(),
            StdinMode::Interactive => Stdio::inherit(),
        };
        Command::new(program)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(InstallerError::from)
    }
}

/// Render a command line for messages.
#[must_use]
pub fn describe_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fail with [`InstallerError::Exec`] unless `status` reports success.
///
/// # Errors
///
/// Returns [`InstallerError::Exec`] carrying the command line and status.
pub fn check_status(status: ExitStatus, program: &str, args: &[&str]) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(InstallerError::Exec {
            command: describe_command(program, args),
            status,
        })
    }
}

/// Locate an executable named `name` on a `PATH`-style search list.
///
/// The search list is passed explicitly rather than read from the process
/// environment. Relative entries resolve against the current directory.
///
/// # Examples
///
/// ```
/// use go_installer::exec::find_on_path;
/// use std::ffi::OsStr;
///
/// assert!(find_on_path("definitely-not-a-command", Some(OsStr::new(""))).is_none());
/// ```
#[must_use]
pub fn find_on_path(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let search_path = search_path?;
    let cwd = std::env::current_dir().unwrap_or_default();
    which::which_in(name, Some(search_path), cwd).ok()
}
