//! End-to-end installation flow.
//!
//! [`Installer::run`] sequences the whole job: resolve the target version,
//! short-circuit when it is already installed, fetch and check the archive,
//! replace the previous tree with root privileges, expose the new `bin`
//! directory on `PATH`, and verify the result through the absolute path of
//! the managed binary.
//!
//! Host facts (OS, architecture, search path, privilege state, home
//! directory) arrive through [`InstallEnvironment`] rather than being read
//! from the process, and the process `PATH` is never modified.

use crate::archive::inspect_archive;
use crate::dirs::BaseDirs;
use crate::download::{HttpReleaseSource, ReleaseSource};
use crate::error::{InstallerError, Result};
use crate::exec::{CommandExecutor, check_status};
use crate::layout::InstallLayout;
use crate::output::{
    DryRunPlan, PathPlan, post_install_note, success_message, up_to_date_message,
    write_stderr_line,
};
use crate::platform::Platform;
use crate::privilege::{PrivilegeSource, PrivilegedExecutor};
use crate::probe::{InstalledVersionProbe, combined_output};
use crate::profile::{ProfileLineWriter, ProfileOutcome, home_profile_paths};
use crate::system_path::{SystemPathInstaller, SystemPathOutcome};
use crate::version::VersionToken;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::io::Write;

/// Collaborators and host facts the installer works with.
pub struct InstallEnvironment<'a> {
    /// Where releases come from.
    pub releases: &'a dyn ReleaseSource,
    /// Runs unprivileged and privileged subprocesses.
    pub executor: &'a dyn CommandExecutor,
    /// Reports the privilege state before each privileged command.
    pub privileges: &'a dyn PrivilegeSource,
    /// Resolves the home directory for profile updates.
    pub dirs: &'a dyn BaseDirs,
    /// Where the toolchain is installed.
    pub layout: InstallLayout,
    /// Host operating system name, e.g. `std::env::consts::OS`.
    pub os: String,
    /// Host architecture name, e.g. `std::env::consts::ARCH`.
    pub arch: String,
    /// `PATH`-style search list used to find `go` and `sudo`.
    pub search_path: Option<OsString>,
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Version override; the latest release is used when absent.
    pub version: Option<String>,
    /// Print the plan instead of acting on it.
    pub dry_run: bool,
    /// Update the user's shell profile.
    pub update_path: bool,
    /// Also register the bin directory system-wide.
    pub system_path: bool,
    /// Directory the archive is downloaded into.
    pub download_dir: Utf8PathBuf,
    /// Suppress progress lines. Warnings and the dry-run plan still print.
    pub quiet: bool,
}

impl Default for InstallRequest {
    fn default() -> Self {
        Self {
            version: None,
            dry_run: false,
            update_path: true,
            system_path: false,
            download_dir: default_download_dir(),
            quiet: false,
        }
    }
}

/// The system temporary directory, or `/tmp` when it is not valid UTF-8.
#[must_use]
pub fn default_download_dir() -> Utf8PathBuf {
    Utf8PathBuf::try_from(std::env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The installed toolchain already matched; nothing was touched.
    UpToDate(VersionToken),
    /// Dry run; the plan was printed and nothing was touched.
    Planned(VersionToken),
    /// A new toolchain was installed.
    Installed(InstallReport),
}

/// Details of a completed installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// The version that was installed.
    pub version: VersionToken,
    /// Whether `go version` reported the expected version.
    pub verified: bool,
    /// Profile update result, when `PATH` updates were requested.
    pub profile: Option<ProfileOutcome>,
    /// System-wide registration result, when requested and successful.
    pub system_path: Option<SystemPathOutcome>,
}

/// Runs the installation flow.
pub struct Installer<'a> {
    env: InstallEnvironment<'a>,
}

impl<'a> Installer<'a> {
    /// Create an installer over `env`.
    #[must_use]
    pub fn new(env: InstallEnvironment<'a>) -> Self {
        Self { env }
    }

    /// Run the flow described by `request`, reporting progress to `stderr`.
    ///
    /// # Errors
    ///
    /// Returns the first hard failure. A failed system-wide `PATH` update and
    /// a version mismatch after installation are reported as warnings only.
    pub fn run(&self, request: &InstallRequest, stderr: &mut dyn Write) -> Result<InstallOutcome> {
        let platform = Platform::resolve(&self.env.os, &self.env.arch)?;
        let target = self.resolve_target(request.version.as_deref())?;

        if self.installed_version().as_ref() == Some(&target) {
            write_stderr_line(stderr, up_to_date_message(&target));
            return Ok(InstallOutcome::UpToDate(target));
        }

        let archive_name = platform.archive_name(target.as_str());
        let url = HttpReleaseSource::archive_url(&archive_name);
        let archive_path = request.download_dir.join(&archive_name);

        if !request.quiet {
            write_stderr_line(stderr, format!("Target version: {target}"));
            write_stderr_line(stderr, format!("Platform: {platform}"));
            write_stderr_line(stderr, format!("Download: {url}\n      to: {archive_path}"));
        }

        if request.dry_run {
            let plan = DryRunPlan {
                version: &target,
                platform,
                url: &url,
                archive_path: &archive_path,
                layout: &self.env.layout,
                path_plan: path_plan(request),
            };
            write_stderr_line(stderr, plan.display_text());
            return Ok(InstallOutcome::Planned(target));
        }

        self.fetch_archive(request, &archive_name, &archive_path, stderr)?;
        if let Err(err) = inspect_archive(archive_path.as_std_path()) {
            warn!("discarding rejected archive {archive_path}");
            if let Err(remove_err) = std::fs::remove_file(&archive_path) {
                debug!("could not remove {archive_path}: {remove_err}");
            }
            return Err(err.into());
        }

        let privileged = PrivilegedExecutor::new(self.env.executor, self.env.privileges);
        self.replace_installation(&privileged, &archive_path)?;
        if !request.quiet {
            write_stderr_line(stderr, format!("Extracted to {}", self.env.layout.root()));
        }

        let (profile, system_path) = if request.update_path {
            self.update_path(request, platform, &privileged, stderr)?
        } else {
            (None, None)
        };

        let verified = self.verify(&target, stderr)?;

        if !request.quiet {
            write_stderr_line(stderr, success_message(&target, &self.env.layout.root()));
            write_stderr_line(
                stderr,
                post_install_note(profile.as_ref().map(ProfileOutcome::path)),
            );
        }

        Ok(InstallOutcome::Installed(InstallReport {
            version: target,
            verified,
            profile,
            system_path,
        }))
    }

    fn resolve_target(&self, requested: Option<&str>) -> Result<VersionToken> {
        match requested.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => VersionToken::normalize(text)
                .filter(|token| !token.is_minimal())
                .ok_or_else(|| InstallerError::InvalidVersion {
                    input: text.to_owned(),
                }),
            None => {
                let latest = self.env.releases.latest_version()?;
                info!("latest Go release is {latest}");
                Ok(latest)
            }
        }
    }

    fn installed_version(&self) -> Option<VersionToken> {
        let managed = self.env.layout.go_binary();
        let probe = InstalledVersionProbe::new(
            self.env.executor,
            &managed,
            self.env.search_path.as_deref(),
        );
        match probe.detect() {
            Ok(version) => {
                debug!("installed Go version is {version}");
                Some(version)
            }
            Err(err) => {
                debug!("{err}");
                None
            }
        }
    }

    fn fetch_archive(
        &self,
        request: &InstallRequest,
        archive_name: &str,
        archive_path: &Utf8Path,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        std::fs::create_dir_all(&request.download_dir)?;
        if archive_path.is_file() {
            if !request.quiet {
                write_stderr_line(stderr, format!("Using existing archive: {archive_path}"));
            }
            return Ok(());
        }

        self.env
            .releases
            .download_archive(archive_name, archive_path.as_std_path())?;
        if !request.quiet {
            write_stderr_line(stderr, format!("Downloaded: {archive_path}"));
        }
        Ok(())
    }

    fn replace_installation(
        &self,
        privileged: &PrivilegedExecutor<'_>,
        archive_path: &Utf8Path,
    ) -> Result<()> {
        let layout = &self.env.layout;
        privileged.run("rm", &["-rf", layout.root().as_str()])?;
        privileged.run(
            "tar",
            &["-C", layout.parent().as_str(), "-xzf", archive_path.as_str()],
        )
    }

    fn update_path(
        &self,
        request: &InstallRequest,
        platform: Platform,
        privileged: &PrivilegedExecutor<'_>,
        stderr: &mut dyn Write,
    ) -> Result<(Option<ProfileOutcome>, Option<SystemPathOutcome>)> {
        let layout = &self.env.layout;
        let bin_dir = layout.bin_dir();

        let candidates = home_profile_paths(self.env.dirs, platform.os)?;
        let writer = ProfileLineWriter::new(bin_dir.as_str(), layout.path_export_line());
        let profile = writer.ensure(&candidates)?;
        if !request.quiet {
            let message = match &profile {
                ProfileOutcome::AlreadyPresent(path) => format!("PATH already configured in {path}"),
                ProfileOutcome::Appended(path) | ProfileOutcome::Created(path) => {
                    format!("Added {bin_dir} to PATH in {path}")
                }
            };
            write_stderr_line(stderr, message);
        }

        if !request.system_path {
            return Ok((Some(profile), None));
        }

        let system = SystemPathInstaller::new(privileged, platform.os, &bin_dir);
        match system.install() {
            Ok(outcome) => Ok((Some(profile), Some(outcome))),
            Err(err) => {
                warn!("system-wide PATH update failed: {err}");
                write_stderr_line(stderr, format!("Warning: system-wide PATH update failed: {err}"));
                Ok((Some(profile), None))
            }
        }
    }

    fn verify(&self, target: &VersionToken, stderr: &mut dyn Write) -> Result<bool> {
        let binary = self.env.layout.go_binary();
        let output = self.env.executor.output(binary.as_str(), &["version"])?;
        let text = combined_output(&output.stdout, &output.stderr);
        let reported = text.trim();
        if !output.status.success() {
            if !reported.is_empty() {
                write_stderr_line(stderr, reported);
            }
            check_status(output.status, binary.as_str(), &["version"])?;
        }

        write_stderr_line(stderr, reported);
        if reported.contains(target.as_str()) {
            return Ok(true);
        }

        warn!("installed Go reported {reported:?}, expected {target}");
        write_stderr_line(
            stderr,
            format!(
                "Warning: installed Go reported '{reported}' which does not contain expected version '{target}'"
            ),
        );
        Ok(false)
    }
}

fn path_plan(request: &InstallRequest) -> PathPlan {
    match (request.update_path, request.system_path) {
        (false, _) => PathPlan::Skip,
        (true, false) => PathPlan::UserProfile,
        (true, true) => PathPlan::UserAndSystem,
    }
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod tests;
