//! Shared test utilities for the installer crate.

use crate::error::{InstallerError, Result};
use crate::exec::{CommandExecutor, StdinMode, describe_command};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    stdout_output("")
}

/// Creates a successful command `Output` with the given stdout text.
#[must_use]
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Writes a gzip-compressed tarball containing `entries` to `path`.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create archive");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *contents)
            .expect("append entry");
    }
    let encoder = builder.into_inner().expect("tar finish");
    encoder.finish().expect("gzip finish");
}

/// Writes a minimal Go release archive whose `go/bin/go` prints `version`.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_go_archive(path: &Path, version: &str) {
    let script = format!("#!/bin/sh\necho \"go version {version} linux/amd64\"\n");
    write_tar_gz(
        path,
        &[
            ("go/VERSION", version.as_bytes()),
            ("go/bin/go", script.as_bytes()),
        ],
    );
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "sudo").
    pub cmd: String,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Expect `cmd args...` and answer with `result`.
    pub fn new(cmd: impl Into<String>, args: &[&str], result: Result<Output>) -> Self {
        Self {
            cmd: cmd.into(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            result,
        }
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations in order and returns predefined
/// results. Captured and streamed invocations share one queue. Arguments
/// equal to [`StubExecutor::ANY_ARG`] match anything, which covers randomly
/// named temporary files.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    calls: RefCell<Vec<String>>,
    stdin_modes: RefCell<Vec<StdinMode>>,
}

impl StubExecutor {
    /// Wildcard argument that matches any value.
    pub const ANY_ARG: &'static str = "<any>";

    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            calls: RefCell::new(Vec::new()),
            stdin_modes: RefCell::new(Vec::new()),
        }
    }

    /// Command lines received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Standard input modes of streamed invocations, in order.
    #[must_use]
    pub fn stdin_modes(&self) -> Vec<StdinMode> {
        self.stdin_modes.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations, {} remain",
            self.expected.borrow().len()
        );
    }

    fn next(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let line = describe_command(cmd, args);
        self.calls.borrow_mut().push(line.clone());

        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(InstallerError::StubMismatch {
                message: format!("unexpected command invocation: {line}"),
            });
        };

        let args_match = call.args.len() == args.len()
            && call
                .args
                .iter()
                .zip(args)
                .all(|(want, got)| want.as_str() == Self::ANY_ARG || want.as_str() == *got);
        if call.cmd != cmd || !args_match {
            return Err(InstallerError::StubMismatch {
                message: format!(
                    "expected `{}`, got `{line}`",
                    describe_command(
                        &call.cmd,
                        &call.args.iter().map(String::as_str).collect::<Vec<_>>()
                    )
                ),
            });
        }

        call.result
    }
}

impl CommandExecutor for StubExecutor {
    fn output(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.next(program, args)
    }

    fn stream(&self, program: &str, args: &[&str], stdin: StdinMode) -> Result<ExitStatus> {
        self.stdin_modes.borrow_mut().push(stdin);
        self.next(program, args).map(|output| output.status)
    }
}
