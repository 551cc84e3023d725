//! Output formatting for the installer CLI.
//!
//! Everything the user sees on the error stream (progress, the dry-run plan,
//! and the closing notes) is built here so the orchestrator only decides
//! *when* to print.

use crate::layout::InstallLayout;
use crate::platform::{OsFamily, Platform};
use crate::profile::profile_candidates;
use crate::system_path::SystemPathTargets;
use crate::version::VersionToken;
use camino::Utf8Path;
use std::fmt::Display;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Message printed when the installed toolchain already matches.
#[must_use]
pub fn up_to_date_message(version: &VersionToken) -> String {
    format!("Go is already up to date ({version}). Nothing to do.")
}

/// Message printed after a successful installation.
#[must_use]
pub fn success_message(version: &VersionToken, root: &Utf8Path) -> String {
    format!("Go {version} installed successfully to {root}.")
}

/// Reminder that existing shells will not see the new `PATH` entry.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use go_installer::output::post_install_note;
///
/// let note = post_install_note(Some(Utf8Path::new("/home/gopher/.profile")));
/// assert!(note.contains("source /home/gopher/.profile"));
/// ```
#[must_use]
pub fn post_install_note(profile: Option<&Utf8Path>) -> String {
    match profile {
        Some(path) => format!(
            "Note: start a new shell session for PATH changes to take effect, or run: source {path}"
        ),
        None => "Note: PATH was not modified; add the Go bin directory to PATH yourself.".to_owned(),
    }
}

/// How the plan intends to expose the toolchain on `PATH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPlan {
    /// Leave `PATH` alone.
    Skip,
    /// Update the user's shell profile.
    UserProfile,
    /// Update the user's shell profile and register system-wide.
    UserAndSystem,
}

/// Everything a dry run reports.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use go_installer::layout::InstallLayout;
/// use go_installer::output::{DryRunPlan, PathPlan};
/// use go_installer::platform::Platform;
/// use go_installer::version::VersionToken;
///
/// let version = VersionToken::normalize("go1.25.1").unwrap();
/// let platform = Platform::resolve("linux", "amd64").unwrap();
/// let layout = InstallLayout::default();
/// let plan = DryRunPlan {
///     version: &version,
///     platform,
///     url: "https://go.dev/dl/go1.25.1.linux-amd64.tar.gz",
///     archive_path: Utf8Path::new("/tmp/go1.25.1.linux-amd64.tar.gz"),
///     layout: &layout,
///     path_plan: PathPlan::UserProfile,
/// };
///
/// let text = plan.display_text();
/// assert!(text.contains("Plan (dry-run)"));
/// assert!(text.contains("go1.25.1"));
/// ```
#[derive(Debug)]
pub struct DryRunPlan<'a> {
    /// Resolved target version.
    pub version: &'a VersionToken,
    /// Resolved host platform.
    pub platform: Platform,
    /// Archive download URL.
    pub url: &'a str,
    /// Local path the archive would be downloaded to.
    pub archive_path: &'a Utf8Path,
    /// Installation layout.
    pub layout: &'a InstallLayout,
    /// Requested `PATH` handling.
    pub path_plan: PathPlan,
}

impl DryRunPlan<'_> {
    /// Format the plan for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            "Plan (dry-run):".to_owned(),
            format!("- Determine version: {}", self.version),
            format!("- Platform: {}", self.platform),
            format!("- Download {} -> {}", self.url, self.archive_path),
            format!("- Remove any previous {}", self.layout.root()),
            format!("- Extract archive into {}", self.layout.parent()),
        ];

        let bin_dir = self.layout.bin_dir();
        match self.path_plan {
            PathPlan::Skip => lines.push("- Skip PATH update (per --no-path-update)".to_owned()),
            PathPlan::UserProfile | PathPlan::UserAndSystem => {
                lines.push(format!(
                    "- Add '{bin_dir}' to PATH in your shell profile (idempotent; one of {})",
                    profile_list(self.platform.os)
                ));
            }
        }
        if self.path_plan == PathPlan::UserAndSystem {
            let targets = SystemPathTargets::for_os(self.platform.os);
            lines.push(format!(
                "- Also add system-wide PATH via {} (fallback {}; requires root)",
                targets.drop_in, targets.fallback_profile
            ));
        }

        lines.push(format!("- Verify with '{} version'", self.layout.go_binary()));
        lines.join("\n")
    }
}

fn profile_list(os: OsFamily) -> String {
    profile_candidates(os)
        .iter()
        .map(|name| format!("~/{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}
