//! Detection of the currently installed Go version.
//!
//! The managed binary under the install layout is asked first because it is
//! the installation this tool replaces. Any failure there (missing file,
//! spawn error, non-zero exit, unparseable output) falls through to the
//! first `go` found on the search path.

use crate::error::{InstallerError, Result};
use crate::exec::{CommandExecutor, find_on_path};
use crate::version::{VersionToken, parse_version_output};
use camino::Utf8Path;
use log::debug;
use std::ffi::OsStr;
use std::path::Path;

/// Name of the Go driver binary.
pub const GO_BINARY: &str = "go";

/// Probes for an installed Go toolchain.
pub struct InstalledVersionProbe<'a> {
    executor: &'a dyn CommandExecutor,
    managed_binary: &'a Utf8Path,
    search_path: Option<&'a OsStr>,
}

impl<'a> InstalledVersionProbe<'a> {
    /// Create a probe that prefers `managed_binary` and then searches
    /// `search_path` (a `PATH`-style list).
    #[must_use]
    pub fn new(
        executor: &'a dyn CommandExecutor,
        managed_binary: &'a Utf8Path,
        search_path: Option<&'a OsStr>,
    ) -> Self {
        Self {
            executor,
            managed_binary,
            search_path,
        }
    }

    /// Report the installed version.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::VersionNotFound`] when neither the managed
    /// binary nor a `go` on the search path yields a version.
    pub fn detect(&self) -> Result<VersionToken> {
        if self.managed_binary.is_file() {
            if let Some(version) = self.query(self.managed_binary.as_std_path()) {
                return Ok(version);
            }
        } else {
            debug!("managed Go binary {} not present", self.managed_binary);
        }

        find_on_path(GO_BINARY, self.search_path)
            .and_then(|fallback| self.query(&fallback))
            .ok_or(InstallerError::VersionNotFound)
    }

    fn query(&self, binary: &Path) -> Option<VersionToken> {
        let program = binary.to_str()?;
        let output = match self.executor.output(program, &["version"]) {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                debug!("{program} version exited with {}", output.status);
                return None;
            }
            Err(err) => {
                debug!("failed to run {program} version: {err}");
                return None;
            }
        };

        let text = combined_output(&output.stdout, &output.stderr);
        let version = parse_version_output(&text);
        if version.is_none() {
            debug!("could not parse version from {text:?}");
        }
        version
    }
}

/// Concatenate stdout and stderr the way a terminal would show them.
pub(crate) fn combined_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(stderr));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, stdout_output};
    use camino::Utf8PathBuf;
    use std::ffi::OsString;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        managed: Utf8PathBuf,
        path_dir: Utf8PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().expect("temp dir");
            let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp dir");
            let managed = root.join("usr/local/go/bin/go");
            let path_dir = root.join("bin");
            std::fs::create_dir_all(&path_dir).expect("create PATH dir");
            Self {
                _temp: temp,
                managed,
                path_dir,
            }
        }

        fn install_managed(&self) {
            write_executable(&self.managed);
        }

        fn install_on_path(&self) -> Utf8PathBuf {
            let binary = self.path_dir.join("go");
            write_executable(&binary);
            binary
        }

        fn search_path(&self) -> OsString {
            OsString::from(self.path_dir.as_str())
        }
    }

    fn write_executable(path: &Utf8Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, "#!/bin/sh\n").expect("write binary");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
                .expect("chmod");
        }
    }

    #[test]
    fn managed_binary_is_authoritative() {
        let fixture = Fixture::new();
        fixture.install_managed();
        fixture.install_on_path();
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            fixture.managed.as_str(),
            &["version"],
            Ok(stdout_output("go version go1.22.6 linux/amd64\n")),
        )]);
        let search = fixture.search_path();

        let probe = InstalledVersionProbe::new(&executor, &fixture.managed, Some(&search));
        let version = probe.detect().expect("version detected");

        assert_eq!(version.as_str(), "go1.22.6");
        executor.assert_finished();
    }

    #[test]
    fn falls_back_to_search_path_when_managed_binary_fails() {
        let fixture = Fixture::new();
        fixture.install_managed();
        let fallback = fixture.install_on_path();
        let executor = StubExecutor::new(vec![
            ExpectedCall::new(
                fixture.managed.as_str(),
                &["version"],
                Ok(failure_output("broken install")),
            ),
            ExpectedCall::new(
                fallback.as_str(),
                &["version"],
                Ok(stdout_output("go version go1.21.3 linux/arm64\n")),
            ),
        ]);
        let search = fixture.search_path();

        let probe = InstalledVersionProbe::new(&executor, &fixture.managed, Some(&search));
        assert_eq!(probe.detect().expect("fallback version").as_str(), "go1.21.3");
        executor.assert_finished();
    }

    #[test]
    fn falls_back_when_managed_output_is_unparseable() {
        let fixture = Fixture::new();
        fixture.install_managed();
        let fallback = fixture.install_on_path();
        let executor = StubExecutor::new(vec![
            ExpectedCall::new(
                fixture.managed.as_str(),
                &["version"],
                Ok(stdout_output("segmentation fault")),
            ),
            ExpectedCall::new(
                fallback.as_str(),
                &["version"],
                Ok(stdout_output("go version go1.20.5 darwin/amd64")),
            ),
        ]);
        let search = fixture.search_path();

        let probe = InstalledVersionProbe::new(&executor, &fixture.managed, Some(&search));
        assert_eq!(probe.detect().expect("fallback version").as_str(), "go1.20.5");
    }

    #[test]
    fn missing_everywhere_is_not_found() {
        let fixture = Fixture::new();
        let executor = StubExecutor::new(Vec::new());
        let search = fixture.search_path();

        let probe = InstalledVersionProbe::new(&executor, &fixture.managed, Some(&search));
        let err = probe.detect().expect_err("nothing installed");

        assert!(matches!(err, InstallerError::VersionNotFound));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn unparseable_fallback_is_not_found() {
        let fixture = Fixture::new();
        let fallback = fixture.install_on_path();
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            fallback.as_str(),
            &["version"],
            Ok(stdout_output("totally unrelated output")),
        )]);
        let search = fixture.search_path();

        let probe = InstalledVersionProbe::new(&executor, &fixture.managed, Some(&search));
        assert!(matches!(probe.detect(), Err(InstallerError::VersionNotFound)));
    }

    #[test]
    fn combined_output_appends_stderr() {
        assert_eq!(combined_output(b"a ", b"b"), "a b");
    }
}
