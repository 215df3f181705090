//! Duplicate sets and the registry that owns them.
//!
//! # Overview
//!
//! Files are fed to a [`RegistryBuilder`] as their fingerprints become
//! known. The first file with a fingerprint is held aside; a set is created
//! the moment a second file matches, and later matches join it. When the
//! scan ends the builder is finalized into an immutable
//! [`DuplicateSetRegistry`], sorting the members of every set once.
//!
//! Sets are iterated in the order in which their fingerprint first produced
//! a second match. Iteration is double-ended, so `.rev()` yields the exact
//! reverse.
//!
//! # Example
//!
//! ```
//! use rmdupes::duplicates::{Fingerprint, RegistryBuilder, SortOrder};
//! use rmdupes::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let fp = Fingerprint::new(4, [7; 32]);
//! let mut builder = RegistryBuilder::new();
//! builder.insert(fp, FileRecord::new(PathBuf::from("/b"), 4));
//! builder.insert(fp, FileRecord::new(PathBuf::from("/a"), 4));
//!
//! let registry = builder.finalize(&SortOrder::default(), 2);
//! assert_eq!(registry.set_count(), 1);
//! assert_eq!(registry.space_occupied(), 4);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use super::sort::{RecordOrdering, SetOrder};
use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// Identity of a file's content: its size plus a hash of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Size in bytes
    pub size: u64,
    /// BLAKE3 hash of the full content
    pub content_hash: Hash,
}

impl Fingerprint {
    /// Create a fingerprint.
    #[must_use]
    pub fn new(size: u64, content_hash: Hash) -> Self {
        Self { size, content_hash }
    }
}

/// Two or more files with identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    fingerprint: Fingerprint,
    members: Vec<FileRecord>,
}

impl DuplicateSet {
    /// Create a set from already-matched members.
    ///
    /// # Arguments
    ///
    /// * `fingerprint` - Shared fingerprint
    /// * `members` - At least two files carrying it
    #[must_use]
    pub fn new(fingerprint: Fingerprint, members: Vec<FileRecord>) -> Self {
        debug_assert!(members.len() >= 2, "a duplicate set needs two members");
        Self {
            fingerprint,
            members,
        }
    }

    /// The shared fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Size of each member in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.fingerprint.size
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.fingerprint.content_hash)
    }

    /// Members in sort order.
    #[must_use]
    pub fn members(&self) -> &[FileRecord] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false` for sets produced by a registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Reclaimable bytes if all but one member were removed.
    #[must_use]
    pub fn space_occupied(&self) -> u64 {
        self.fingerprint
            .size
            .saturating_mul((self.members.len() as u64).saturating_sub(1))
    }

    /// Number of members beyond the first.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Paths of all members, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.members.iter().map(|m| m.path.clone()).collect()
    }
}

/// What happened to a record handed to [`RegistryBuilder::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// First file with this fingerprint; not yet in any set
    Pending,
    /// A second match created a new set at this index
    NewSet(usize),
    /// The record joined the existing set at this index
    Joined(usize),
}

/// Append-only accumulator used while a scan is running.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    sets: Vec<DuplicateSet>,
    index: HashMap<Fingerprint, usize>,
    singles: HashMap<Fingerprint, FileRecord>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fingerprinted record.
    pub fn insert(&mut self, fingerprint: Fingerprint, record: FileRecord) -> InsertOutcome {
        if let Some(&idx) = self.index.get(&fingerprint) {
            self.sets[idx].members.push(record);
            return InsertOutcome::Joined(idx);
        }

        match self.singles.remove(&fingerprint) {
            Some(first) => {
                let idx = self.sets.len();
                log::debug!(
                    "New duplicate set {}: {} and {}",
                    hash_to_hex(&fingerprint.content_hash),
                    first.path.display(),
                    record.path.display()
                );
                self.sets
                    .push(DuplicateSet::new(fingerprint, vec![first, record]));
                self.index.insert(fingerprint, idx);
                InsertOutcome::NewSet(idx)
            }
            None => {
                self.singles.insert(fingerprint, record);
                InsertOutcome::Pending
            }
        }
    }

    /// Number of sets created so far.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Number of files in sets so far.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.sets.iter().map(DuplicateSet::len).sum()
    }

    /// Freeze the builder, sorting each set's members once.
    ///
    /// Fingerprints that never matched a second file are dropped.
    #[must_use]
    pub fn finalize(
        self,
        ordering: &dyn RecordOrdering,
        files_examined: u64,
    ) -> DuplicateSetRegistry {
        let mut sets = self.sets;
        for set in &mut sets {
            set.members.sort_by(|a, b| ordering.compare(a, b));
        }
        DuplicateSetRegistry {
            sets,
            files_examined,
        }
    }
}

/// The immutable result of one scan.
#[derive(Debug, Clone, Default)]
pub struct DuplicateSetRegistry {
    sets: Vec<DuplicateSet>,
    files_examined: u64,
}

impl DuplicateSetRegistry {
    /// Iterate sets front to back; call `.rev()` for back to front.
    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateSet> {
        self.sets.iter()
    }

    /// Number of sets.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Number of files across all sets.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.sets.iter().map(DuplicateSet::len).sum()
    }

    /// Number of files examined by the scan that produced this registry.
    #[must_use]
    pub fn files_examined(&self) -> u64 {
        self.files_examined
    }

    /// Sum of reclaimable bytes over all sets.
    #[must_use]
    pub fn space_occupied(&self) -> u64 {
        self.sets
            .iter()
            .map(DuplicateSet::space_occupied)
            .fold(0, u64::saturating_add)
    }

    /// The set at `index`, in iteration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DuplicateSet> {
        self.sets.get(index)
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Reorder the sets. Members within each set are not touched.
    pub fn sort_sets(&mut self, order: SetOrder) {
        self.sets.sort_by(|a, b| order.compare(a, b));
    }
}

impl<'a> IntoIterator for &'a DuplicateSetRegistry {
    type Item = &'a DuplicateSet;
    type IntoIter = std::slice::Iter<'a, DuplicateSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

impl IntoIterator for DuplicateSetRegistry {
    type Item = DuplicateSet;
    type IntoIter = std::vec::IntoIter<DuplicateSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.into_iter()
    }
}
