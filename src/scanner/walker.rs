//! Deterministic directory walker built on `walkdir`.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which traverses one search
//! root and yields a [`FileRecord`] for every regular file that passes the
//! [`PathFilter`].
//!
//! # Features
//!
//! - Depth-first traversal with children sorted by file name
//! - Recursive or single-level scans
//! - Optional symlink following with cycle detection
//! - Hidden and size filtering
//! - Same-file detection via [`SeenFiles`]
//! - Graceful shutdown via atomic flag
//!
//! Per-entry failures are yielded as [`ScanError`] values and never stop
//! the walk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::filter::{walk_error_to_scan_error, FilterDecision, PathFilter};
use super::same_file::SeenFiles;
use super::{FileRecord, ScanError};
use crate::config::ScanConfiguration;

/// Directory walker for one search root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Eligibility rules
    filter: PathFilter,
    /// Descend into subdirectories
    recurse: bool,
    /// Resolve symlinks while walking
    follow_symlinks: bool,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory to scan
    /// * `config` - Scan configuration
    #[must_use]
    pub fn new(root: &Path, config: &ScanConfiguration) -> Self {
        Self {
            root: root.to_path_buf(),
            filter: PathFilter::new(config),
            recurse: config.recurse,
            follow_symlinks: config.follow_symlinks,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// The root this walker traverses.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree, yielding eligible files and per-entry errors.
    ///
    /// Files already recorded in `seen` (reached through a hard link, a
    /// followed symlink or an earlier root) are skipped silently.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rmdupes::config::ScanConfiguration;
    /// use rmdupes::scanner::{SeenFiles, Walker};
    /// use std::path::Path;
    ///
    /// let config = ScanConfiguration::default();
    /// let walker = Walker::new(Path::new("."), &config);
    /// let mut seen = SeenFiles::new();
    /// let files: Vec<_> = walker.walk(&mut seen).filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk<'a>(
        &'a self,
        seen: &'a mut SeenFiles,
    ) -> impl Iterator<Item = Result<FileRecord, ScanError>> + 'a {
        let mut walk_dir = WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();
        if !self.recurse {
            walk_dir = walk_dir.max_depth(1);
        }
        let mut entries = walk_dir.into_iter();

        std::iter::from_fn(move || loop {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let err = walk_error_to_scan_error(&self.root, e);
                    log::warn!("{}", err);
                    return Some(Err(err));
                }
            };

            // The root was validated by the caller.
            if entry.depth() == 0 {
                continue;
            }

            let metadata = match self.filter.decide(&entry) {
                Ok(FilterDecision::File(metadata)) => metadata,
                Ok(FilterDecision::Directory) => continue,
                Ok(FilterDecision::Exclude(reason)) => {
                    log::trace!("Excluding {} ({:?})", entry.path().display(), reason);
                    if entry.file_type().is_dir() {
                        entries.skip_current_dir();
                    }
                    continue;
                }
                Err(err) => {
                    log::warn!("{}", err);
                    return Some(Err(err));
                }
            };

            if seen.check_and_record(&metadata) {
                log::debug!("Skipping already examined file: {}", entry.path().display());
                continue;
            }

            return Some(Ok(FileRecord::from_metadata(
                entry.into_path(),
                &metadata,
            )));
        })
    }
}
