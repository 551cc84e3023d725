//! Pre-flight inspection of downloaded Go archives.
//!
//! The archive is read once with `flate2` and `tar` before the previous
//! installation is removed. Entries must stay relative to the extraction
//! parent, and the driver binary must be present where the layout expects
//! it. This is a layout check only; no checksums are involved.

use std::path::{Component, Path};

/// Path of the Go driver inside a release archive.
pub const GO_BINARY_ENTRY: &str = "go/bin/go";

/// Errors arising from archive inspection.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O or decompression error while reading the archive.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry would land outside the extraction parent.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive has no `go/bin/go` entry.
    #[error("archive does not contain {GO_BINARY_ENTRY}")]
    MissingGoBinary,
}

/// Summary of an inspected archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of entries read.
    pub entries: usize,
}

/// Inspect the gzip-compressed tarball at `archive_path`.
///
/// # Errors
///
/// Returns [`ArchiveError::PathTraversal`] if any entry is absolute or
/// contains `..`, [`ArchiveError::MissingGoBinary`] if `go/bin/go` is absent,
/// and [`ArchiveError::Io`] if the file is not a readable `.tar.gz`.
pub fn inspect_archive(archive_path: &Path) -> Result<ArchiveSummary, ArchiveError> {
    let file = std::fs::File::open(archive_path)?;
    let decoder = flate2::read::GzDecoder::new(std::io::BufReader::new(file));
    let mut archive = tar::Archive::new(decoder);

    let mut entries = 0;
    let mut has_go_binary = false;
    for entry_result in archive.entries()? {
        let entry = entry_result?;
        let entry_path = entry.path()?;
        validate_entry_path(&entry_path)?;

        has_go_binary |= entry_path == Path::new(GO_BINARY_ENTRY);
        entries += 1;
    }

    if !has_go_binary {
        return Err(ArchiveError::MissingGoBinary);
    }
    Ok(ArchiveSummary { entries })
}

/// Validate that a tar entry path does not escape the extraction parent
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ArchiveError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::RootDir));
    if escapes {
        return Err(ArchiveError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
