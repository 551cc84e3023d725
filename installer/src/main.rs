//! Go installer CLI entrypoint.
//!
//! This binary installs or updates the Go toolchain under `/usr/local/go`
//! and exposes it on `PATH`. All collaborators are wired to the real host
//! here; the flow itself lives in [`go_installer::installer`].

use clap::Parser;
use go_installer::cli::Cli;
use go_installer::dirs::SystemBaseDirs;
use go_installer::download::HttpReleaseSource;
use go_installer::error::Result;
use go_installer::exec::SystemCommandExecutor;
use go_installer::installer::{InstallEnvironment, InstallOutcome, Installer};
use go_installer::layout::InstallLayout;
use go_installer::output::write_stderr_line;
use go_installer::privilege::SystemPrivilegeSource;
use std::io::Write;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Route `log` records through a `tracing` formatter on stderr.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    let registry = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
    );
    if registry.try_init().is_err() {
        // A subscriber is already installed; keep it.
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let search_path = std::env::var_os("PATH");
    let releases = HttpReleaseSource;
    let executor = SystemCommandExecutor;
    let privileges = SystemPrivilegeSource::new(search_path.clone());
    let dirs = SystemBaseDirs;

    let installer = Installer::new(InstallEnvironment {
        releases: &releases,
        executor: &executor,
        privileges: &privileges,
        dirs: &dirs,
        layout: InstallLayout::default(),
        os: std::env::consts::OS.to_owned(),
        arch: std::env::consts::ARCH.to_owned(),
        search_path,
    });

    match installer.run(&cli.install_request(), stderr)? {
        InstallOutcome::UpToDate(version) => log::info!("{version} already installed"),
        InstallOutcome::Planned(version) => log::info!("dry run for {version} complete"),
        InstallOutcome::Installed(report) => log::info!(
            "installed {} (verified: {})",
            report.version,
            report.verified
        ),
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
