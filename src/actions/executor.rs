//! Runs the chosen action over a finished registry.
//!
//! # Overview
//!
//! For every set the executor picks a keeper, re-verifies it, and then
//! removes or links every other member. Failures are collected in an
//! [`ActionReport`]; one failed member or set never stops the others.
//! The keeper itself is never touched.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::delete::{remove_file, ActionError, FileSnapshot};
use super::link::replace_with_link;
use crate::config::{Action, ActionConfiguration};
use crate::duplicates::{DuplicateSet, DuplicateSetRegistry};

/// Chooses which member of a set survives.
pub trait KeeperChooser {
    /// Return the 0-based index of the member to keep.
    ///
    /// # Arguments
    ///
    /// * `set_number` - 1-based position of the set in iteration order
    /// * `set` - The set, members in sort order
    ///
    /// # Errors
    ///
    /// Any I/O error fails this set only.
    fn choose_keeper(&mut self, set_number: usize, set: &DuplicateSet) -> io::Result<usize>;
}

/// Always keeps the first member in sort order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstMember;

impl KeeperChooser for FirstMember {
    fn choose_keeper(&mut self, _set_number: usize, _set: &DuplicateSet) -> io::Result<usize> {
        Ok(0)
    }
}

/// Tally of one action run.
#[derive(Debug, Default)]
pub struct ActionReport {
    /// Sets whose members were all processed (successfully or not)
    pub sets_processed: usize,
    /// Members removed by the delete action
    pub files_removed: usize,
    /// Members replaced by links
    pub files_linked: usize,
    /// Bytes freed
    pub bytes_reclaimed: u64,
    /// Ordinary failures
    pub failures: Vec<ActionError>,
    /// Members removed whose replacement link could not be created
    pub data_loss: Vec<ActionError>,
    /// Whether shutdown stopped the run early
    pub interrupted: bool,
}

impl ActionReport {
    /// Number of ordinary failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of data loss risk entries.
    #[must_use]
    pub fn data_loss_count(&self) -> usize {
        self.data_loss.len()
    }

    /// Members successfully processed.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.files_removed + self.files_linked
    }

    /// Check if every member was processed without error.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && self.data_loss.is_empty() && !self.interrupted
    }

    /// Generate a one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} removed, {} linked, {} failed, {} reclaimed",
            self.files_removed,
            self.files_linked,
            self.failure_count(),
            bytesize::ByteSize::b(self.bytes_reclaimed)
        );
        if !self.data_loss.is_empty() {
            text.push_str(&format!(", {} at risk of data loss", self.data_loss_count()));
        }
        text
    }

    fn record_error(&mut self, error: ActionError) {
        if error.is_data_loss_risk() {
            self.data_loss.push(error);
        } else {
            log::warn!("{}", error);
            self.failures.push(error);
        }
    }
}

/// Applies one [`Action`] to every set of a registry.
#[derive(Debug)]
pub struct ActionExecutor {
    config: ActionConfiguration,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ActionExecutor {
    /// Create an executor.
    #[must_use]
    pub fn new(config: ActionConfiguration) -> Self {
        Self {
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag checked between sets.
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

    /// Run the action.
    ///
    /// `chooser` is consulted only for delete and link when prompting is
    /// enabled; otherwise the first member is kept.
    pub fn execute(
        &self,
        registry: &DuplicateSetRegistry,
        chooser: &mut dyn KeeperChooser,
    ) -> ActionReport {
        let mut report = ActionReport::default();
        if self.config.action == Action::Summary {
            return report;
        }

        for (idx, set) in registry.iter().enumerate() {
            if self.is_shutdown_requested() {
                log::info!("Action interrupted by shutdown signal");
                report.interrupted = true;
                break;
            }
            self.process_set(idx + 1, set, chooser, &mut report);
            report.sets_processed += 1;
        }

        log::info!("Action complete: {}", report.summary());
        report
    }

    fn process_set(
        &self,
        set_number: usize,
        set: &DuplicateSet,
        chooser: &mut dyn KeeperChooser,
        report: &mut ActionReport,
    ) {
        let keeper_idx = if self.config.no_prompt {
            0
        } else {
            match chooser.choose_keeper(set_number, set) {
                Ok(idx) => idx,
                Err(source) => {
                    report.record_error(ActionError::KeeperSelection {
                        set: set_number,
                        source,
                    });
                    return;
                }
            }
        };

        let Some(keeper) = set.members().get(keeper_idx) else {
            report.record_error(ActionError::InvalidKeeper {
                set: set_number,
                index: keeper_idx,
                len: set.len(),
            });
            return;
        };

        match FileSnapshot::from_record(keeper).verify() {
            Ok(()) => {}
            Err(ActionError::NotFound(path)) => {
                report.record_error(ActionError::KeeperMissing(path));
                return;
            }
            Err(e) => {
                report.record_error(e);
                return;
            }
        }
        log::debug!("Set {}: keeping {}", set_number, keeper.path.display());

        for (idx, member) in set.members().iter().enumerate() {
            if idx == keeper_idx {
                continue;
            }
            if let Err(e) = FileSnapshot::from_record(member).verify() {
                report.record_error(e);
                continue;
            }

            match self.config.action {
                Action::Delete => match remove_file(&member.path, self.config.removal) {
                    Ok(result) => {
                        report.files_removed += 1;
                        report.bytes_reclaimed += result.size;
                    }
                    Err(e) => report.record_error(e),
                },
                Action::Link => {
                    match replace_with_link(&member.path, &keeper.path, self.config.removal) {
                        Ok(result) => {
                            report.files_linked += 1;
                            report.bytes_reclaimed += result.size;
                        }
                        Err(e) => report.record_error(e),
                    }
                }
                Action::Summary => {}
            }
        }
    }
}
