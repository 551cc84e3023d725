//! Unit tests for the installation flow.

use super::*;
use crate::dirs::FixedBaseDirs;
use crate::download::{DownloadError, MockReleaseSource};
use crate::privilege::ExecutionContext;
use crate::test_utils::{
    ExpectedCall, StubExecutor, failure_output, stdout_output, success_output, write_go_archive,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const ARCHIVE: &str = "go1.25.1.linux-amd64.tar.gz";

struct Sandbox {
    _temp: TempDir,
    layout: InstallLayout,
    home: Utf8PathBuf,
    downloads: Utf8PathBuf,
    empty_path: OsString,
}

impl Sandbox {
    fn archive_path(&self) -> Utf8PathBuf {
        self.downloads.join(ARCHIVE)
    }

    fn request(&self, version: Option<&str>) -> InstallRequest {
        InstallRequest {
            version: version.map(str::to_owned),
            download_dir: self.downloads.clone(),
            ..InstallRequest::default()
        }
    }

    fn environment<'a>(
        &self,
        releases: &'a dyn ReleaseSource,
        executor: &'a dyn CommandExecutor,
        privileges: &'a dyn PrivilegeSource,
        dirs: &'a dyn BaseDirs,
        arch: &str,
    ) -> InstallEnvironment<'a> {
        InstallEnvironment {
            releases,
            executor,
            privileges,
            dirs,
            layout: self.layout.clone(),
            os: "linux".to_owned(),
            arch: arch.to_owned(),
            search_path: Some(self.empty_path.clone()),
        }
    }

    fn install_calls(&self) -> Vec<ExpectedCall> {
        let root = self.layout.root();
        let archive = self.archive_path();
        vec![
            ExpectedCall::new("rm", &["-rf", root.as_str()], Ok(success_output())),
            ExpectedCall::new(
                "tar",
                &["-C", self.layout.parent().as_str(), "-xzf", archive.as_str()],
                Ok(success_output()),
            ),
        ]
    }

    fn verify_call(&self, reported: &str) -> ExpectedCall {
        ExpectedCall::new(
            self.layout.go_binary().as_str(),
            &["version"],
            Ok(stdout_output(reported)),
        )
    }
}

#[fixture]
fn sandbox() -> Sandbox {
    let temp = TempDir::new().expect("temp dir");
    let base = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp dir");
    let home = base.join("home");
    let empty = base.join("empty-path");
    std::fs::create_dir_all(&home).expect("create home");
    std::fs::create_dir_all(&empty).expect("create search dir");
    Sandbox {
        layout: InstallLayout::new(base.join("usr/local")),
        home,
        downloads: base.join("downloads"),
        empty_path: OsString::from(empty.as_str()),
        _temp: temp,
    }
}

fn serving_archive(version: &'static str) -> MockReleaseSource {
    let mut releases = MockReleaseSource::new();
    releases
        .expect_download_archive()
        .withf(|name, _| name == ARCHIVE)
        .times(1)
        .returning(move |_, dest| {
            write_go_archive(dest, version);
            Ok(())
        });
    releases
}

fn stderr_text(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("stderr was not UTF-8")
}

#[rstest]
fn installed_target_version_short_circuits(sandbox: Sandbox) {
    let managed = sandbox.layout.go_binary();
    std::fs::create_dir_all(managed.parent().expect("bin dir")).expect("create bin dir");
    std::fs::write(&managed, "#!/bin/sh\n").expect("write managed binary");

    let releases = MockReleaseSource::new();
    let executor = StubExecutor::new(vec![sandbox.verify_call("go version go1.22.6 linux/amd64\n")]);
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let mut stderr = Vec::new();
    let outcome = installer
        .run(&sandbox.request(Some("1.22.6")), &mut stderr)
        .expect("up to date");

    assert!(matches!(outcome, InstallOutcome::UpToDate(ref v) if v.as_str() == "go1.22.6"));
    assert!(stderr_text(stderr).contains("already up to date"));
    assert!(!sandbox.downloads.exists());
    assert!(!sandbox.home.join(".profile").exists());
    executor.assert_finished();
}

#[rstest]
#[case::riscv("riscv64")]
#[case::mips("mips")]
fn unsupported_architecture_fails_before_network(sandbox: Sandbox, #[case] arch: &str) {
    let releases = MockReleaseSource::new();
    let executor = StubExecutor::new(Vec::new());
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, arch));

    let err = installer
        .run(&sandbox.request(None), &mut Vec::new())
        .expect_err("unsupported arch");

    assert!(matches!(err, InstallerError::UnsupportedPlatform { kind: "arch", ref value, .. } if value == arch));
    assert!(executor.calls().is_empty());
}

#[rstest]
#[case::bare_prefix("go")]
#[case::garbage("!!!")]
fn version_without_release_number_is_rejected(sandbox: Sandbox, #[case] input: &str) {
    let releases = MockReleaseSource::new();
    let executor = StubExecutor::new(Vec::new());
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let err = installer
        .run(&sandbox.request(Some(input)), &mut Vec::new())
        .expect_err("invalid version");

    assert!(matches!(err, InstallerError::InvalidVersion { .. }));
}

#[rstest]
fn dry_run_prints_plan_without_mutation(sandbox: Sandbox) {
    let mut releases = MockReleaseSource::new();
    releases
        .expect_latest_version()
        .times(1)
        .returning(|| Ok(VersionToken::normalize("go1.25.1").expect("token")));
    let executor = StubExecutor::new(Vec::new());
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "x86_64"));

    let request = InstallRequest {
        dry_run: true,
        system_path: true,
        ..sandbox.request(None)
    };
    let mut stderr = Vec::new();
    let outcome = installer.run(&request, &mut stderr).expect("dry run");

    assert!(matches!(outcome, InstallOutcome::Planned(ref v) if v.as_str() == "go1.25.1"));
    let text = stderr_text(stderr);
    assert!(text.contains("Plan (dry-run)"));
    assert!(text.contains("https://go.dev/dl/go1.25.1.linux-amd64.tar.gz"));
    assert!(text.contains("/etc/profile.d/golang-path.sh"));
    assert!(!sandbox.downloads.exists());
    assert!(executor.calls().is_empty());
}

#[rstest]
fn fresh_install_downloads_extracts_and_updates_profile(sandbox: Sandbox) {
    let releases = serving_archive("go1.25.1");
    let mut calls = sandbox.install_calls();
    calls.push(sandbox.verify_call("go version go1.25.1 linux/amd64\n"));
    let executor = StubExecutor::new(calls);
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let mut stderr = Vec::new();
    let outcome = installer
        .run(&sandbox.request(Some("go1.25.1")), &mut stderr)
        .expect("install succeeds");

    let InstallOutcome::Installed(report) = outcome else {
        panic!("expected an installation, got {outcome:?}");
    };
    assert!(report.verified);
    assert_eq!(
        report.profile,
        Some(ProfileOutcome::Created(sandbox.home.join(".profile")))
    );
    assert_eq!(report.system_path, None);

    let profile = std::fs::read_to_string(sandbox.home.join(".profile")).expect("profile");
    assert!(profile.contains(&sandbox.layout.path_export_line()));
    let text = stderr_text(stderr);
    assert!(text.contains("go version go1.25.1 linux/amd64"));
    assert!(text.contains("installed successfully"));
    assert!(text.contains("source"));
    executor.assert_finished();
}

#[rstest]
fn existing_archive_is_reused(sandbox: Sandbox) {
    std::fs::create_dir_all(&sandbox.downloads).expect("create downloads");
    write_go_archive(sandbox.archive_path().as_std_path(), "go1.25.1");

    let releases = MockReleaseSource::new();
    let mut calls = sandbox.install_calls();
    calls.push(sandbox.verify_call("go version go1.25.1 linux/amd64\n"));
    let executor = StubExecutor::new(calls);
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let request = InstallRequest {
        update_path: false,
        ..sandbox.request(Some("go1.25.1"))
    };
    let mut stderr = Vec::new();
    installer.run(&request, &mut stderr).expect("install succeeds");

    assert!(stderr_text(stderr).contains("Using existing archive"));
    assert!(!sandbox.home.join(".profile").exists());
    executor.assert_finished();
}

#[rstest]
fn version_mismatch_is_only_a_warning(sandbox: Sandbox) {
    let releases = serving_archive("go1.25.1");
    let mut calls = sandbox.install_calls();
    calls.push(sandbox.verify_call("go version go1.24.0 linux/amd64\n"));
    let executor = StubExecutor::new(calls);
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let mut stderr = Vec::new();
    let outcome = installer
        .run(&sandbox.request(Some("go1.25.1")), &mut stderr)
        .expect("mismatch does not abort");

    assert!(matches!(outcome, InstallOutcome::Installed(ref report) if !report.verified));
    assert!(stderr_text(stderr).contains("Warning: installed Go reported"));
}

#[rstest]
fn failing_verification_binary_is_fatal(sandbox: Sandbox) {
    let releases = serving_archive("go1.25.1");
    let mut calls = sandbox.install_calls();
    calls.push(ExpectedCall::new(
        sandbox.layout.go_binary().as_str(),
        &["version"],
        Ok(failure_output("exec format error")),
    ));
    let executor = StubExecutor::new(calls);
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let err = installer
        .run(&sandbox.request(Some("go1.25.1")), &mut Vec::new())
        .expect_err("verification fails");

    assert!(matches!(err, InstallerError::Exec { ref command, .. } if command.ends_with("go version")));
}

#[rstest]
fn system_path_failure_is_only_a_warning(sandbox: Sandbox) {
    let releases = serving_archive("go1.25.1");
    let mut calls = sandbox.install_calls();
    calls.push(ExpectedCall::new(
        "install",
        &["-m", "0644", StubExecutor::ANY_ARG, "/etc/profile.d/golang-path.sh"],
        Ok(failure_output("read-only file system")),
    ));
    calls.push(ExpectedCall::new(
        "sh",
        &["-c", StubExecutor::ANY_ARG],
        Ok(failure_output("read-only file system")),
    ));
    calls.push(sandbox.verify_call("go version go1.25.1 linux/amd64\n"));
    let executor = StubExecutor::new(calls);
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let request = InstallRequest {
        system_path: true,
        ..sandbox.request(Some("go1.25.1"))
    };
    let mut stderr = Vec::new();
    let outcome = installer.run(&request, &mut stderr).expect("warning only");

    assert!(matches!(outcome, InstallOutcome::Installed(ref report) if report.system_path.is_none()));
    assert!(stderr_text(stderr).contains("Warning: system-wide PATH update failed"));
    executor.assert_finished();
}

#[rstest]
fn missing_home_directory_is_fatal(sandbox: Sandbox) {
    let releases = serving_archive("go1.25.1");
    let executor = StubExecutor::new(sandbox.install_calls());
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(None);
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let err = installer
        .run(&sandbox.request(Some("go1.25.1")), &mut Vec::new())
        .expect_err("no home directory");

    assert!(matches!(err, InstallerError::HomeDirectory));
}

#[rstest]
fn download_status_error_is_network_error(sandbox: Sandbox) {
    let mut releases = MockReleaseSource::new();
    releases.expect_download_archive().returning(|name, _| {
        Err(DownloadError::Status {
            url: HttpReleaseSource::archive_url(name),
            status: 404,
        })
    });
    let executor = StubExecutor::new(Vec::new());
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let err = installer
        .run(&sandbox.request(Some("go1.25.1")), &mut Vec::new())
        .expect_err("404");

    assert!(matches!(err, InstallerError::Network { ref reason, .. } if reason.contains("404")));
    assert!(executor.calls().is_empty());
}

#[rstest]
fn malformed_archive_aborts_before_removing_install(sandbox: Sandbox) {
    let mut releases = MockReleaseSource::new();
    releases.expect_download_archive().returning(|_, dest| {
        std::fs::write(dest, "<html>not a tarball</html>").map_err(DownloadError::Io)
    });
    let executor = StubExecutor::new(Vec::new());
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));

    let err = installer
        .run(&sandbox.request(Some("go1.25.1")), &mut Vec::new())
        .expect_err("bad archive");

    assert!(matches!(err, InstallerError::Archive(_)));
    assert!(executor.calls().is_empty());
    assert!(!sandbox.archive_path().exists());
}

#[rstest]
fn rejected_archive_is_downloaded_again_next_run(sandbox: Sandbox) {
    std::fs::create_dir_all(&sandbox.downloads).expect("downloads dir");
    std::fs::write(sandbox.archive_path(), "truncated").expect("seed archive");
    let mut releases = MockReleaseSource::new();
    releases.expect_download_archive().times(1).returning(|_, dest| {
        write_go_archive(dest, "go1.25.1");
        Ok(())
    });
    let mut calls = sandbox.install_calls();
    calls.push(sandbox.verify_call("go version go1.25.1 linux/amd64\n"));
    let executor = StubExecutor::new(calls);
    let context = ExecutionContext::root();
    let dirs = FixedBaseDirs::new(Some(sandbox.home.clone()));
    let installer = Installer::new(sandbox.environment(&releases, &executor, &context, &dirs, "amd64"));
    let mut request = sandbox.request(Some("go1.25.1"));
    request.update_path = false;

    let err = installer
        .run(&request, &mut Vec::new())
        .expect_err("reused archive is rejected");
    assert!(matches!(err, InstallerError::Archive(_)));

    let outcome = installer
        .run(&request, &mut Vec::new())
        .expect("second run downloads afresh");
    assert!(matches!(outcome, InstallOutcome::Installed(_)));
    executor.assert_finished();
}

#[rstest]
#[case::skip(false, false, PathPlan::Skip)]
#[case::skip_ignores_system(false, true, PathPlan::Skip)]
#[case::user(true, false, PathPlan::UserProfile)]
#[case::both(true, true, PathPlan::UserAndSystem)]
fn path_plan_follows_flags(#[case] update_path: bool, #[case] system_path: bool, #[case] expected: PathPlan) {
    let request = InstallRequest {
        update_path,
        system_path,
        ..InstallRequest::default()
    };
    assert_eq!(path_plan(&request), expected);
}
