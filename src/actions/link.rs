//! Replace a duplicate with a symbolic link to the keeper.
//!
//! The member is removed first and the link created in its place. If the
//! link cannot be created after a permanent removal, the member's data only
//! survives in the keeper; that outcome is reported as
//! [`ActionError::DataLossRisk`] and logged at error level. After a trash
//! removal the original is recoverable, so the same failure is an ordinary
//! [`ActionError::LinkFailed`].

use std::io;
use std::path::{Path, PathBuf};

use super::delete::{remove_file, ActionError, RemovalMode};

/// Result of a successful link replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    /// The former duplicate, now a symlink
    pub path: PathBuf,
    /// Absolute path the link points to
    pub target: PathBuf,
    /// Bytes freed by removing the duplicate
    pub size: u64,
}

/// Replace `path` with a symbolic link to the absolute path of `keeper`.
///
/// # Errors
///
/// - Any removal error from [`remove_file`]; nothing has changed on disk
/// - `DataLossRisk` if the link failed after a permanent removal
/// - `LinkFailed` if the link failed after a trash removal
pub fn replace_with_link(
    path: &Path,
    keeper: &Path,
    mode: RemovalMode,
) -> Result<LinkResult, ActionError> {
    let target = std::path::absolute(keeper).map_err(|e| ActionError::Io {
        path: keeper.to_path_buf(),
        source: e,
    })?;

    let removed = remove_file(path, mode)?;

    if let Err(source) = create_symlink(&target, path) {
        return Err(match mode {
            RemovalMode::Permanent => {
                log::error!(
                    "DATA LOSS RISK: removed {} but could not link it to {}: {}",
                    path.display(),
                    target.display(),
                    source
                );
                ActionError::DataLossRisk {
                    path: path.to_path_buf(),
                    keeper: target,
                    source,
                }
            }
            RemovalMode::Trash => {
                log::warn!(
                    "Could not link {} to {} (original is in the trash): {}",
                    path.display(),
                    target.display(),
                    source
                );
                ActionError::LinkFailed {
                    path: path.to_path_buf(),
                    keeper: target,
                    source,
                }
            }
        });
    }

    log::info!("Linked {} -> {}", path.display(), target.display());

    Ok(LinkResult {
        path: path.to_path_buf(),
        target,
        size: removed.size,
    })
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
