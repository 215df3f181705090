//! Detection of files reached more than once.
//!
//! # Overview
//!
//! The same on-disk file can be reached through several names: hard links,
//! a followed symlink pointing at a file already scanned, or overlapping
//! search roots. Such names share one inode, so they are not duplicates of
//! each other. Treating them as duplicates would be dangerous, since deleting
//! "all but one" could remove the only copy of the data.
//!
//! # Platform Support
//!
//! - **Unix**: (device id, inode) pairs from file metadata
//! - **Other**: detection disabled; every name is treated as a distinct file

use std::collections::HashSet;
use std::fs::Metadata;

/// Remembers which files have already been examined in this scan.
///
/// Not thread-safe; the walker owns one per scan.
#[derive(Debug, Default)]
pub struct SeenFiles {
    seen: HashSet<FileIdentity>,
}

impl SeenFiles {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Record the file and report whether it was already seen.
    ///
    /// Returns `false` on the first occurrence and on platforms without
    /// identity support.
    pub fn check_and_record(&mut self, metadata: &Metadata) -> bool {
        match FileIdentity::from_metadata(metadata) {
            Some(id) => !self.seen.insert(id),
            None => false,
        }
    }

    /// Number of distinct files recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Whether identity tracking works on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
