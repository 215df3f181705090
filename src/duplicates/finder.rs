//! Scan orchestration.
//!
//! # Overview
//!
//! [`DuplicateFinder::scan`] walks each search root, keys every eligible
//! file by size, and hashes only files whose size collides with another
//! file:
//!
//! 1. The first file of a size is held pending.
//! 2. When a second file of that size arrives, both are queued for hashing.
//! 3. Later files of that size are queued on arrival.
//!
//! Queued files are hashed in batches on a bounded rayon pool. Results are
//! inserted into the registry serially in discovery order, so the outcome
//! does not depend on thread scheduling.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{DuplicateSetRegistry, Fingerprint, InsertOutcome, RegistryBuilder};
use crate::config::{ConfigError, ScanConfiguration};
use crate::progress::ScanEventSink;
use crate::scanner::{FileRecord, HashError, Hasher, ScanError, SeenFiles, Walker};

/// Files examined between two progress events.
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Default number of queued files hashed per batch.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Running counters for the current scan.
///
/// Updated by the finder and readable from any thread while a scan runs.
#[derive(Debug, Default)]
pub struct ScanStatistics {
    files_examined: AtomicU64,
    duplicate_files: AtomicU64,
    duplicate_sets: AtomicU64,
    space_occupied: AtomicU64,
    files_hashed: AtomicU64,
    errors: AtomicU64,
}

impl ScanStatistics {
    /// Files that passed the filter so far.
    #[must_use]
    pub fn files_examined(&self) -> u64 {
        self.files_examined.load(Ordering::Relaxed)
    }

    /// Files that belong to some duplicate set.
    #[must_use]
    pub fn duplicate_files(&self) -> u64 {
        self.duplicate_files.load(Ordering::Relaxed)
    }

    /// Duplicate sets found.
    #[must_use]
    pub fn duplicate_sets(&self) -> u64 {
        self.duplicate_sets.load(Ordering::Relaxed)
    }

    /// Reclaimable bytes over all sets.
    #[must_use]
    pub fn space_occupied(&self) -> u64 {
        self.space_occupied.load(Ordering::Relaxed)
    }

    /// Files whose content was hashed.
    #[must_use]
    pub fn files_hashed(&self) -> u64 {
        self.files_hashed.load(Ordering::Relaxed)
    }

    /// Per-entry errors reported.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        for counter in [
            &self.files_examined,
            &self.duplicate_files,
            &self.duplicate_sets,
            &self.space_occupied,
            &self.files_hashed,
            &self.errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn record_examined(&self) -> u64 {
        self.files_examined.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn record_insert(&self, outcome: InsertOutcome, size: u64) {
        match outcome {
            InsertOutcome::Pending => {}
            InsertOutcome::NewSet(_) => {
                self.duplicate_sets.fetch_add(1, Ordering::Relaxed);
                self.duplicate_files.fetch_add(2, Ordering::Relaxed);
                self.add_space(size);
            }
            InsertOutcome::Joined(_) => {
                self.duplicate_files.fetch_add(1, Ordering::Relaxed);
                self.add_space(size);
            }
        }
    }

    fn add_space(&self, size: u64) {
        // The closure always returns Some, so the update cannot fail.
        let _ = self
            .space_occupied
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_add(size))
            });
    }
}

/// Summary statistics from a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files that passed the filter
    pub files_examined: u64,
    /// Files belonging to a duplicate set
    pub duplicate_files: u64,
    /// Number of duplicate sets
    pub duplicate_sets: u64,
    /// Reclaimable bytes
    pub space_occupied: u64,
    /// Files whose content was hashed
    pub files_hashed: u64,
    /// Per-entry errors reported to the sink
    pub errors: u64,
    /// Wall-clock duration
    pub duration: Duration,
}

impl ScanSummary {
    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.space_occupied).to_string()
    }
}

/// Errors that end a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The provided path could not be made absolute.
    #[error("Failed to resolve {path}: {source}")]
    UnresolvableRoot {
        /// The root as given
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

enum SizeBucket {
    /// First file of this size, not yet hashed
    Pending(FileRecord, usize),
    /// Two or more files seen; every one is queued for hashing
    Colliding,
}

struct ScanState {
    buckets: HashMap<u64, SizeBucket>,
    queue: Vec<(FileRecord, usize)>,
    builder: RegistryBuilder,
}

/// Runs scans for one configuration.
///
/// # Example
///
/// ```no_run
/// use rmdupes::config::ScanConfiguration;
/// use rmdupes::duplicates::DuplicateFinder;
/// use rmdupes::progress::QuietSink;
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(ScanConfiguration::default());
/// let (registry, summary) = finder.scan(&[PathBuf::from(".")], &QuietSink).unwrap();
///
/// println!("Found {} duplicate sets", registry.set_count());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: ScanConfiguration,
    hasher: Hasher,
    shutdown_flag: Option<Arc<AtomicBool>>,
    batch_size: usize,
    stats: Arc<ScanStatistics>,
}

impl DuplicateFinder {
    /// Create a finder for the given configuration.
    #[must_use]
    pub fn new(config: ScanConfiguration) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
            shutdown_flag: None,
            batch_size: DEFAULT_BATCH_SIZE,
            stats: Arc::new(ScanStatistics::default()),
        }
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.hasher = self.hasher.with_shutdown_flag(Arc::clone(&flag));
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set how many queued files are hashed per batch (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Live counters for the running (or last) scan.
    #[must_use]
    pub fn statistics(&self) -> Arc<ScanStatistics> {
        Arc::clone(&self.stats)
    }

    /// The configuration this finder scans with.
    #[must_use]
    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Scan the roots and group duplicate files.
    ///
    /// Every root is validated before any traversal starts. Per-entry
    /// failures go to `sink` and the scan continues.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - the configuration is invalid
    /// - a root does not exist or is not a directory
    /// - the scan is interrupted by the shutdown flag; partial results are
    ///   discarded and no completed event is emitted
    pub fn scan(
        &self,
        roots: &[PathBuf],
        sink: &dyn ScanEventSink,
    ) -> Result<(DuplicateSetRegistry, ScanSummary), FinderError> {
        let start_time = Instant::now();
        self.config.validate()?;
        for root in roots {
            if !root.exists() {
                return Err(FinderError::PathNotFound(root.clone()));
            }
            if !root.is_dir() {
                return Err(FinderError::NotADirectory(root.clone()));
            }
            self.config.check_timestamp_support(root)?;
        }
        let roots = roots
            .iter()
            .map(|root| resolve_root(root))
            .collect::<Result<Vec<_>, _>>()?;

        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        self.stats.reset();
        let pool = self.build_pool();
        let mut state = ScanState {
            buckets: HashMap::new(),
            queue: Vec::new(),
            builder: RegistryBuilder::new(),
        };
        let mut seen = SeenFiles::new();

        for (root_idx, root) in roots.iter().enumerate() {
            log::info!("Starting duplicate scan of {}", root.display());
            sink.on_scan_started(root);

            let mut walker = Walker::new(root, &self.config);
            if let Some(flag) = &self.shutdown_flag {
                walker = walker.with_shutdown_flag(Arc::clone(flag));
            }

            for result in walker.walk(&mut seen) {
                match result {
                    Ok(record) => {
                        let examined = self.stats.record_examined();
                        self.enqueue(&mut state, record, root_idx);
                        if examined % PROGRESS_INTERVAL == 0 {
                            sink.on_scan_progress(examined, self.stats.duplicate_sets());
                        }
                        if state.queue.len() >= self.batch_size {
                            self.flush(&mut state, pool.as_ref(), &roots, sink)?;
                        }
                    }
                    Err(e) => self.report(sink, Some(root), &e),
                }
            }

            if self.is_shutdown_requested() {
                log::info!("Scan interrupted by shutdown signal");
                return Err(FinderError::Interrupted);
            }
        }

        self.flush(&mut state, pool.as_ref(), &roots, sink)?;
        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let files_examined = self.stats.files_examined();
        let registry = state.builder.finalize(&self.config.sort, files_examined);

        let summary = ScanSummary {
            files_examined,
            duplicate_files: registry.file_count() as u64,
            duplicate_sets: registry.set_count() as u64,
            space_occupied: registry.space_occupied(),
            files_hashed: self.stats.files_hashed(),
            errors: self.stats.errors(),
            duration: start_time.elapsed(),
        };

        log::info!(
            "Scan complete: {} files examined, {} sets, {} duplicate files, {} reclaimable",
            summary.files_examined,
            summary.duplicate_sets,
            summary.duplicate_files,
            summary.reclaimable_display()
        );
        sink.on_scan_completed(
            summary.files_examined,
            summary.duplicate_files,
            summary.duplicate_sets,
            summary.space_occupied,
        );

        Ok((registry, summary))
    }

    fn build_pool(&self) -> Option<rayon::ThreadPool> {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!(
                    "Failed to create hashing thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                None
            }
        }
    }

    fn enqueue(&self, state: &mut ScanState, record: FileRecord, root_idx: usize) {
        match state.buckets.remove(&record.size) {
            None => {
                let size = record.size;
                state
                    .buckets
                    .insert(size, SizeBucket::Pending(record, root_idx));
            }
            Some(SizeBucket::Pending(first, first_root)) => {
                log::trace!(
                    "Size collision at {} bytes: {} and {}",
                    record.size,
                    first.path.display(),
                    record.path.display()
                );
                state
                    .buckets
                    .insert(record.size, SizeBucket::Colliding);
                state.queue.push((first, first_root));
                state.queue.push((record, root_idx));
            }
            Some(SizeBucket::Colliding) => {
                state
                    .buckets
                    .insert(record.size, SizeBucket::Colliding);
                state.queue.push((record, root_idx));
            }
        }
    }

    fn flush(
        &self,
        state: &mut ScanState,
        pool: Option<&rayon::ThreadPool>,
        roots: &[PathBuf],
        sink: &dyn ScanEventSink,
    ) -> Result<(), FinderError> {
        if state.queue.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut state.queue);
        log::debug!("Hashing batch of {} files", batch.len());

        let hasher = &self.hasher;
        let hash_batch = move || {
            batch
                .into_par_iter()
                .map(|(record, root_idx)| {
                    let hash = hasher.content_hash(&record.path);
                    (record, root_idx, hash)
                })
                .collect::<Vec<_>>()
        };
        let results = match pool {
            Some(pool) => pool.install(hash_batch),
            None => hash_batch(),
        };

        for (record, root_idx, hash) in results {
            match hash {
                Ok(content_hash) => {
                    self.stats.files_hashed.fetch_add(1, Ordering::Relaxed);
                    let size = record.size;
                    let outcome = state
                        .builder
                        .insert(Fingerprint::new(size, content_hash), record);
                    self.stats.record_insert(outcome, size);
                }
                Err(HashError::Interrupted(_)) => return Err(FinderError::Interrupted),
                Err(e) => {
                    let root = roots.get(root_idx).map(PathBuf::as_path);
                    self.report(sink, root, &ScanError::from(e));
                }
            }
        }

        sink.on_scan_progress(self.stats.files_examined(), self.stats.duplicate_sets());
        Ok(())
    }

    fn report(&self, sink: &dyn ScanEventSink, root: Option<&Path>, error: &ScanError) {
        self.stats.errors.fetch_add(1, Ordering::Relaxed);
        log::warn!("{}", error);
        sink.on_scan_error(root, error.path(), error);
    }
}

/// Make a search root absolute against the current directory.
///
/// Symlinks are not resolved, so a root reached through a link keeps the
/// link in every recorded path.
fn resolve_root(root: &Path) -> Result<PathBuf, FinderError> {
    std::path::absolute(root).map_err(|source| FinderError::UnresolvableRoot {
        path: root.to_path_buf(),
        source,
    })
}
