//! Scan lifecycle notifications.
//!
//! The finder reports what it is doing through a [`ScanEventSink`]. Every
//! method has a no-op default, so an implementation only overrides what it
//! cares about.
//!
//! - [`QuietSink`] ignores everything.
//! - [`ConsoleSink`] draws an indicatif spinner on stderr and prints
//!   coloured error lines.
//! - [`EventCollector`] records events in memory.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use yansi::Paint;

use crate::scanner::ScanError;

/// Receiver of scan lifecycle events.
///
/// Events for one scan arrive in this order: `on_scan_started` for each
/// root, then any number of progress and error events, then
/// `on_scan_completed` exactly once. The files count passed to
/// `on_scan_progress` never decreases.
pub trait ScanEventSink: Send + Sync {
    /// A search root is about to be traversed.
    fn on_scan_started(&self, _root: &Path) {}

    /// Periodic counters.
    ///
    /// # Arguments
    ///
    /// * `files_examined` - Files examined so far
    /// * `sets_found` - Duplicate sets found so far
    fn on_scan_progress(&self, _files_examined: u64, _sets_found: u64) {}

    /// A single entry could not be scanned. The scan continues.
    ///
    /// # Arguments
    ///
    /// * `context` - The search root being traversed, if known
    /// * `path` - The entry that failed
    /// * `error` - What went wrong
    fn on_scan_error(&self, _context: Option<&Path>, _path: &Path, _error: &ScanError) {}

    /// The scan finished.
    fn on_scan_completed(
        &self,
        _files_examined: u64,
        _duplicate_files: u64,
        _sets_found: u64,
        _space_occupied: u64,
    ) {
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuietSink;

impl ScanEventSink for QuietSink {}

/// Interactive console reporter.
pub struct ConsoleSink {
    spinner: ProgressBar,
    quiet: bool,
}

impl ConsoleSink {
    /// Create a console sink.
    ///
    /// # Arguments
    ///
    /// * `quiet` - Suppress the spinner and informational lines; errors are
    ///   still printed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let spinner = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };
        Self { spinner, quiet }
    }

    fn line(&self, text: &str) {
        if self.spinner.is_hidden() {
            eprintln!("{}", text);
        } else {
            self.spinner.println(text);
        }
    }
}

impl ScanEventSink for ConsoleSink {
    fn on_scan_started(&self, root: &Path) {
        if self.quiet {
            return;
        }
        self.line(&format!("Starting scan of directory {}...", root.display()));
    }

    fn on_scan_progress(&self, files_examined: u64, sets_found: u64) {
        self.spinner.set_message(format!(
            "Files encountered: {}, duplicate sets found: {}",
            files_examined, sets_found
        ));
    }

    fn on_scan_error(&self, _context: Option<&Path>, path: &Path, error: &ScanError) {
        self.line(&format!(
            "{} An error occurred while scanning the file or directory {} - {}",
            "Error:".red().bold(),
            path.display(),
            error
        ));
    }

    fn on_scan_completed(
        &self,
        files_examined: u64,
        _duplicate_files: u64,
        sets_found: u64,
        _space_occupied: u64,
    ) {
        self.spinner.finish_and_clear();
        if !self.quiet {
            eprintln!(
                "Files examined: {}, duplicate sets found: {}",
                files_examined, sets_found
            );
        }
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        // An interrupted or failed scan never reaches `on_scan_completed`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A root was entered
    Started(PathBuf),
    /// Counters: files examined, sets found
    Progress(u64, u64),
    /// A per-entry error, rendered to text
    Error {
        /// Root being traversed
        context: Option<PathBuf>,
        /// Failing entry
        path: PathBuf,
        /// Error message
        message: String,
        /// Whether it was a symlink cycle
        symlink_cycle: bool,
    },
    /// Final counters: files examined, duplicate files, sets, space
    Completed(u64, u64, u64, u64),
}

/// Sink that stores every event for later inspection.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Mutex<Vec<ScanEvent>>,
}

impl EventCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<ScanEvent> {
        self.events
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    /// Just the error events.
    #[must_use]
    pub fn errors(&self) -> Vec<ScanEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, ScanEvent::Error { .. }))
            .collect()
    }

    fn push(&self, event: ScanEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ScanEventSink for EventCollector {
    fn on_scan_started(&self, root: &Path) {
        self.push(ScanEvent::Started(root.to_path_buf()));
    }

    fn on_scan_progress(&self, files_examined: u64, sets_found: u64) {
        self.push(ScanEvent::Progress(files_examined, sets_found));
    }

    fn on_scan_error(&self, context: Option<&Path>, path: &Path, error: &ScanError) {
        self.push(ScanEvent::Error {
            context: context.map(Path::to_path_buf),
            path: path.to_path_buf(),
            message: error.to_string(),
            symlink_cycle: error.is_symlink_cycle(),
        });
    }

    fn on_scan_completed(
        &self,
        files_examined: u64,
        duplicate_files: u64,
        sets_found: u64,
        space_occupied: u64,
    ) {
        self.push(ScanEvent::Completed(
            files_examined,
            duplicate_files,
            sets_found,
            space_occupied,
        ));
    }
}
