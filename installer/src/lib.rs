//! Go toolchain installer library.
//!
//! This crate provides the core functionality for installing the Go
//! toolchain under `/usr/local/go`: resolving the release to install,
//! detecting what is already there, replacing it with root privileges, and
//! idempotently exposing the `bin` directory on `PATH`. It is used by the
//! `go-installer` CLI binary and can be consumed programmatically for
//! testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`archive`] - Pre-flight layout check of downloaded archives
//! - [`cli`] - Command-line argument definitions
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`download`] - Release metadata and archive retrieval
//! - [`error`] - Semantic error types with recovery hints
//! - [`exec`] - Subprocess execution and command lookup
//! - [`installer`] - End-to-end installation flow
//! - [`layout`] - Filesystem locations of the installed toolchain
//! - [`output`] - User-facing messages and the dry-run plan
//! - [`platform`] - Supported operating systems and architectures
//! - [`privilege`] - Running commands as root
//! - [`probe`] - Detection of the installed Go version
//! - [`profile`] - Idempotent shell profile updates
//! - [`system_path`] - System-wide `PATH` registration
//! - [`version`] - Version token normalisation

pub mod archive;
pub mod cli;
pub mod dirs;
pub mod download;
pub mod error;
pub mod exec;
pub mod installer;
pub mod layout;
pub mod output;
pub mod platform;
pub mod privilege;
pub mod probe;
pub mod profile;
pub mod system_path;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
