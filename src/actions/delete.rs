//! File removal, permanent or to the system trash.
//!
//! # Overview
//!
//! This module provides the removal primitives used by the delete and link
//! actions:
//! - Permanent deletion (default)
//! - Move to system trash (recoverable)
//! - Re-verification of a member before it is touched
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::actions::delete::{remove_file, RemovalMode};
//! use std::path::Path;
//!
//! match remove_file(Path::new("/path/to/duplicate.txt"), RemovalMode::Trash) {
//!     Ok(result) => println!("Removed: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scanner::FileRecord;

/// Error type for delete and link operations.
#[derive(Debug, Error)]
pub enum ActionError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when accessing the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The member chosen to survive no longer exists.
    #[error("keeper no longer exists: {0}")]
    KeeperMissing(PathBuf),

    /// The keeper chooser returned an index outside the set.
    #[error("set {set}: keeper index {index} is out of range (set has {len} members)")]
    InvalidKeeper {
        /// 1-based set number
        set: usize,
        /// Index returned by the chooser
        index: usize,
        /// Number of members
        len: usize,
    },

    /// The keeper chooser itself failed.
    #[error("set {set}: could not choose a keeper: {source}")]
    KeeperSelection {
        /// 1-based set number
        set: usize,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Permanent removal failed.
    #[error("remove failed for {path}: {source}")]
    RemoveFailed {
        /// File that could not be removed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File that could not be trashed
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// The member was permanently removed but the link could not be created.
    #[error("DATA LOSS RISK: {path} was removed but the link to {keeper} could not be created: {source}")]
    DataLossRisk {
        /// Removed member
        path: PathBuf,
        /// Intended link target
        keeper: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The member was moved to the trash but the link could not be created.
    #[error("link to {keeper} could not be created at {path} (original is in the trash): {source}")]
    LinkFailed {
        /// Trashed member
        path: PathBuf,
        /// Intended link target
        keeper: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ActionError {
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

    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::KeeperMissing(p)
            | Self::RemoveFailed { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::DataLossRisk { path: p, .. }
            | Self::LinkFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::InvalidKeeper { .. } | Self::KeeperSelection { .. } => None,
        }
    }

    /// Whether data may have been lost.
    #[must_use]
    pub fn is_data_loss_risk(&self) -> bool {
        matches!(self, Self::DataLossRisk { .. })
    }
}

/// How a removed member is disposed of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Unlink the file
    #[default]
    Permanent,
    /// Move the file to the system trash
    Trash,
}

impl RemovalMode {
    /// Pick the mode from the `--trash` flag.
    #[must_use]
    pub fn from_trash_flag(trash: bool) -> Self {
        if trash {
            Self::Trash
        } else {
            Self::Permanent
        }
    }
}

/// Result of a successful removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalResult {
    /// Path that was removed.
    pub path: PathBuf,
    /// Size of the removed file in bytes.
    pub size: u64,
    /// How it was removed.
    pub mode: RemovalMode,
}

/// File metadata snapshot used to re-verify a member before acting on it.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: Option<SystemTime>,
}

impl FileSnapshot {
    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, ActionError> {
        let metadata = fs::metadata(path).map_err(|e| ActionError::from_io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }

    /// The state recorded when the file was scanned.
    #[must_use]
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            size: record.size,
            mtime: record.modified,
        }
    }

    /// Verify that the file still matches this snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if file was modified, deleted, or can't be accessed.
    pub fn verify(&self) -> Result<(), ActionError> {
        let current = Self::capture(&self.path)?;

        if let (Some(orig), Some(curr)) = (self.mtime, current.mtime) {
            if orig != curr {
                log::warn!(
                    "File modified since scan: {} (mtime changed)",
                    self.path.display()
                );
                return Err(ActionError::Modified(self.path.clone()));
            }
        }

        if self.size != current.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                self.path.display(),
                self.size,
                current.size
            );
            return Err(ActionError::Modified(self.path.clone()));
        }

        Ok(())
    }
}

/// Remove a file using the given mode.
///
/// # Errors
///
/// See [`permanent_delete`] and [`delete_to_trash`].
pub fn remove_file(path: &Path, mode: RemovalMode) -> Result<RemovalResult, ActionError> {
    match mode {
        RemovalMode::Permanent => permanent_delete(path),
        RemovalMode::Trash => delete_to_trash(path),
    }
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<RemovalResult, ActionError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| ActionError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        ActionError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(RemovalResult {
        path: path.to_path_buf(),
        size,
        mode: RemovalMode::Trash,
    })
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `RemoveFailed` if the unlink fails
pub fn permanent_delete(path: &Path) -> Result<RemovalResult, ActionError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| ActionError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        ActionError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(RemovalResult {
        path: path.to_path_buf(),
        size,
        mode: RemovalMode::Permanent,
    })
}
