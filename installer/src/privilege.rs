//! Running commands with root privileges.
//!
//! Each call decides afresh whether to run the command directly (already
//! root) or through `sudo`. The decision inputs are gathered into an
//! [`ExecutionContext`] supplied by a [`PrivilegeSource`], so nothing is
//! read from ambient process state inside the executor itself.

use crate::error::{InstallerError, Result};
use crate::exec::{CommandExecutor, StdinMode, check_status, find_on_path};
use log::debug;
use std::ffi::OsString;
use std::path::PathBuf;

/// Name of the escalation helper looked up on the search path.
pub const ESCALATION_HELPER: &str = "sudo";

/// Privilege facts for one privileged operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Whether the process already runs with an effective UID of 0.
    pub privileged: bool,
    /// Resolved path of the escalation helper, when one is available.
    pub escalation_helper: Option<PathBuf>,
}

impl ExecutionContext {
    /// A context for a process that is already root.
    #[must_use]
    pub fn root() -> Self {
        Self {
            privileged: true,
            escalation_helper: None,
        }
    }

    /// A context for an unprivileged process with the given helper.
    #[must_use]
    pub fn unprivileged(escalation_helper: Option<PathBuf>) -> Self {
        Self {
            privileged: false,
            escalation_helper,
        }
    }
}

/// Supplies the current [`ExecutionContext`].
pub trait PrivilegeSource {
    /// Inspect the current privilege state.
    fn current(&self) -> ExecutionContext;
}

/// A fixed context, useful when the caller has already decided.
impl PrivilegeSource for ExecutionContext {
    fn current(&self) -> ExecutionContext {
        self.clone()
    }
}

/// Reads the effective UID and looks for `sudo` on a search path.
#[derive(Debug, Clone, Default)]
pub struct SystemPrivilegeSource {
    search_path: Option<OsString>,
}

impl SystemPrivilegeSource {
    /// Create a source that resolves the helper on `search_path`.
    #[must_use]
    pub fn new(search_path: Option<OsString>) -> Self {
        Self { search_path }
    }
}

impl PrivilegeSource for SystemPrivilegeSource {
    fn current(&self) -> ExecutionContext {
        ExecutionContext {
            privileged: effective_uid_is_root(),
            escalation_helper: find_on_path(ESCALATION_HELPER, self.search_path.as_deref()),
        }
    }
}

#[cfg(unix)]
fn effective_uid_is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn effective_uid_is_root() -> bool {
    false
}

/// Runs commands as root, escalating through `sudo` when needed.
pub struct PrivilegedExecutor<'a> {
    executor: &'a dyn CommandExecutor,
    privileges: &'a dyn PrivilegeSource,
}

impl<'a> PrivilegedExecutor<'a> {
    /// Create an executor that consults `privileges` on every call.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, privileges: &'a dyn PrivilegeSource) -> Self {
        Self {
            executor,
            privileges,
        }
    }

    /// Run `program args...` as root, streaming its output to the console.
    ///
    /// When escalating, `sudo -v` is run first to refresh cached
    /// credentials; its outcome is ignored. The escalated command keeps
    /// standard input so `sudo` can prompt for a password.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Privilege`] when the process is not root and
    /// `sudo` is unavailable, and [`InstallerError::Exec`] when the command
    /// exits unsuccessfully.
    pub fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        let context = self.privileges.current();
        if context.privileged {
            debug!("already privileged; running {program} directly");
            let status = self.executor.stream(program, args, StdinMode::Closed)?;
            return check_status(status, program, args);
        }

        let helper_path = context
            .escalation_helper
            .ok_or_else(|| InstallerError::Privilege {
                message: format!(
                    "this action requires root and `{ESCALATION_HELPER}` was not found; \
                     re-run the installer as root"
                ),
            })?;
        let helper = helper_path.to_str().ok_or_else(|| InstallerError::Privilege {
            message: format!(
                "escalation helper path {} is not valid UTF-8",
                helper_path.display()
            ),
        })?;

        match self
            .executor
            .stream(helper, &["-v"], StdinMode::Interactive)
        {
            Ok(status) if !status.success() => {
                debug!("credential refresh exited with {status}; continuing");
            }
            Ok(_) => {}
            Err(err) => debug!("credential refresh failed: {err}; continuing"),
        }

        let mut escalated = Vec::with_capacity(args.len() + 1);
        escalated.push(program);
        escalated.extend_from_slice(args);
        let status = self
            .executor
            .stream(helper, &escalated, StdinMode::Interactive)?;
        check_status(status, helper, &escalated)
    }
}
