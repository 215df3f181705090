//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Deciding which entries are eligible for scanning ([`filter`])
//! - Deterministic directory walking with symlink cycle detection ([`walker`])
//! - Size keys and streaming BLAKE3 content hashes ([`hasher`])
//! - Detecting files already seen through another name ([`same_file`])
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::config::ScanConfiguration;
//! use rmdupes::scanner::{SeenFiles, Walker};
//! use std::path::Path;
//!
//! let config = ScanConfiguration {
//!     min_size: 1024,
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), &config);
//! let mut seen = SeenFiles::new();
//! for entry in walker.walk(&mut seen) {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod filter;
pub mod hasher;
pub mod same_file;
pub mod walker;

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use filter::{is_hidden, ExcludeReason, FilterDecision, PathFilter};
pub use hasher::{hash_to_hex, Hash, Hasher, CHUNK_SIZE};
pub use same_file::SeenFiles;
pub use walker::Walker;

/// One scanned file.
///
/// Timestamps are optional because not every platform or filesystem
/// records all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Creation (birth) time
    pub created: Option<SystemTime>,
    /// Last access time
    pub accessed: Option<SystemTime>,
    /// Last modification time
    pub modified: Option<SystemTime>,
}

impl FileRecord {
    /// Create a record with no timestamps.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            created: None,
            accessed: None,
            modified: None,
        }
    }

    /// Build a record from already-fetched metadata.
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        Self {
            path,
            size: metadata.len(),
            created: metadata.created().ok(),
            accessed: metadata.accessed().ok(),
            modified: metadata.modified().ok(),
        }
    }

    /// Set the modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Set the access time.
    #[must_use]
    pub fn with_accessed(mut self, accessed: SystemTime) -> Self {
        self.accessed = Some(accessed);
        self
    }

    /// Set the creation time.
    #[must_use]
    pub fn with_created(mut self, created: SystemTime) -> Self {
        self.created = Some(created);
        self
    }
}

/// Errors that can occur while scanning a single entry.
///
/// None of these abort a scan: they are delivered to the
/// [`ScanEventSink`](crate::progress::ScanEventSink) and the entry is skipped.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry vanished or a symlink target does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A followed symlink points back at one of its own ancestors.
    #[error("Symlink cycle: {path} leads back to {ancestor}")]
    SymlinkCycle {
        /// The link that closes the cycle
        path: PathBuf,
        /// The ancestor directory it resolves to
        ancestor: PathBuf,
    },

    /// Content hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) => p,
            Self::Io { path, .. } | Self::SymlinkCycle { path, .. } => path,
            Self::Hash(e) => e.path(),
        }
    }

    /// Whether this error reports a symlink cycle.
    #[must_use]
    pub fn is_symlink_cycle(&self) -> bool {
        matches!(self, Self::SymlinkCycle { .. })
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
