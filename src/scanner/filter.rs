//! Per-entry eligibility decisions.
//!
//! The rules are applied in a fixed order:
//!
//! 1. Symlinks are excluded unless symlinks are being followed.
//! 2. Hidden entries are excluded when hidden files are skipped. A hidden
//!    directory is not descended into.
//! 3. Regular files outside `[min_size, max_size]` are excluded.
//!
//! Anything else is included. Failing to read metadata is reported as an
//! error and the entry is treated as excluded by the caller.

use std::ffi::OsStr;
use std::fs::Metadata;
use std::path::Path;

use walkdir::DirEntry;

use super::ScanError;
use crate::config::ScanConfiguration;

/// Why an entry was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeReason {
    /// A symlink while symlinks are not followed
    Symlink,
    /// A hidden entry while hidden files are skipped
    Hidden,
    /// Smaller than the minimum size
    TooSmall,
    /// Larger than the maximum size
    TooLarge,
    /// Neither a regular file nor a directory (sockets, devices, ...)
    NotAFile,
}

/// Outcome of filtering one entry.
#[derive(Debug)]
pub enum FilterDecision {
    /// A directory to traverse
    Directory,
    /// A regular file to fingerprint, with its (symlink-resolved) metadata
    File(Metadata),
    /// The entry is skipped
    Exclude(ExcludeReason),
}

/// Applies the symlink, hidden and size rules of a [`ScanConfiguration`].
#[derive(Debug, Clone, Copy)]
pub struct PathFilter {
    follow_symlinks: bool,
    skip_hidden: bool,
    min_size: u64,
    max_size: u64,
}

impl PathFilter {
    /// Build a filter from the scan configuration.
    #[must_use]
    pub fn new(config: &ScanConfiguration) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            skip_hidden: config.skip_hidden,
            min_size: config.min_size,
            max_size: config.max_size,
        }
    }

    /// Check if a file size is within the configured bounds.
    #[must_use]
    pub fn passes_size_filter(&self, size: u64) -> Result<(), ExcludeReason> {
        if size < self.min_size {
            Err(ExcludeReason::TooSmall)
        } else if size > self.max_size {
            Err(ExcludeReason::TooLarge)
        } else {
            Ok(())
        }
    }

    /// Decide whether a walked entry is traversed, fingerprinted or skipped.
    ///
    /// The search root (depth 0) is never excluded as hidden.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the entry's metadata cannot be read.
    pub fn decide(&self, entry: &DirEntry) -> Result<FilterDecision, ScanError> {
        if entry.path_is_symlink() && !self.follow_symlinks {
            return Ok(FilterDecision::Exclude(ExcludeReason::Symlink));
        }

        if self.skip_hidden && entry.depth() > 0 && is_hidden_name(entry.file_name()) {
            return Ok(FilterDecision::Exclude(ExcludeReason::Hidden));
        }

        let metadata = entry
            .metadata()
            .map_err(|e| walk_error_to_scan_error(entry.path(), e))?;

        if self.skip_hidden && entry.depth() > 0 && has_hidden_attribute(&metadata) {
            return Ok(FilterDecision::Exclude(ExcludeReason::Hidden));
        }

        if metadata.is_dir() {
            return Ok(FilterDecision::Directory);
        }
        if !metadata.is_file() {
            return Ok(FilterDecision::Exclude(ExcludeReason::NotAFile));
        }

        match self.passes_size_filter(metadata.len()) {
            Ok(()) => Ok(FilterDecision::File(metadata)),
            Err(reason) => Ok(FilterDecision::Exclude(reason)),
        }
    }
}

/// Whether a path is hidden by the platform's convention.
///
/// On every platform a leading `.` marks a hidden name. On Windows the
/// HIDDEN attribute is honoured as well when metadata is supplied.
#[must_use]
pub fn is_hidden(path: &Path, metadata: Option<&Metadata>) -> bool {
    let by_name = path.file_name().is_some_and(is_hidden_name);
    by_name || metadata.is_some_and(has_hidden_attribute)
}

fn is_hidden_name(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') && name != "." && name != ".."
}

#[cfg(windows)]
fn has_hidden_attribute(metadata: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn has_hidden_attribute(_metadata: &Metadata) -> bool {
    false
}

/// Convert a walkdir error into a [`ScanError`], recognising symlink loops.
pub(crate) fn walk_error_to_scan_error(fallback: &Path, error: walkdir::Error) -> ScanError {
    let path = error
        .path()
        .map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);

    if let Some(ancestor) = error.loop_ancestor() {
        return ScanError::SymlinkCycle {
            path,
            ancestor: ancestor.to_path_buf(),
        };
    }

    match error.into_io_error() {
        Some(io) => ScanError::from_io(&path, io),
        None => ScanError::Io {
            path,
            source: std::io::Error::other("directory walk failed"),
        },
    }
}
