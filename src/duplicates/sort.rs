//! Member and set ordering.
//!
//! # Overview
//!
//! A [`SortOrder`] is chosen once per run and applied to the members of
//! every duplicate set when the registry is finalized. It is a runtime value
//! behind the [`RecordOrdering`] trait, so callers may supply their own
//! comparator as well.
//!
//! Every strategy breaks ties by full path, ascending, in both directions.
//! Missing timestamps compare as older than any present timestamp.

use std::cmp::Ordering;
use std::fs::Metadata;
use std::io;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::groups::DuplicateSet;
use crate::scanner::FileRecord;

/// How members of a duplicate set are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    /// File name, compared as the full path.
    ///
    /// Paths order component by component, so files in one directory sort
    /// by file name and identical names in different directories fall back
    /// to their parent directories. This keeps every set in plain path
    /// order.
    #[default]
    Name,
    /// Creation (birth) time
    CreationTime,
    /// Last access time
    LastReadTime,
    /// Last modification time
    LastWriteTime,
    /// Size in bytes
    Size,
}

impl SortStrategy {
    /// The timestamp this strategy reads, if any.
    #[must_use]
    pub fn required_timestamp(self) -> Option<TimestampField> {
        match self {
            Self::CreationTime => Some(TimestampField::Created),
            Self::LastReadTime => Some(TimestampField::Accessed),
            Self::LastWriteTime => Some(TimestampField::Modified),
            Self::Name | Self::Size => None,
        }
    }

    /// Short name used in logs and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreationTime => "creation-time",
            Self::LastReadTime => "last-read-time",
            Self::LastWriteTime => "last-write-time",
            Self::Size => "size",
        }
    }
}

impl std::fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the three file timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampField {
    /// Creation (birth) time
    Created,
    /// Last access time
    Accessed,
    /// Last modification time
    Modified,
}

impl TimestampField {
    /// Human-readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "creation time",
            Self::Accessed => "last-read time",
            Self::Modified => "last-write time",
        }
    }

    /// The value recorded for this field.
    #[must_use]
    pub fn of(self, record: &FileRecord) -> Option<SystemTime> {
        match self {
            Self::Created => record.created,
            Self::Accessed => record.accessed,
            Self::Modified => record.modified,
        }
    }

    /// Read this field from metadata, failing if the platform lacks it.
    ///
    /// # Errors
    ///
    /// Returns the platform's `Unsupported` error when the field is absent.
    pub fn read(self, metadata: &Metadata) -> io::Result<SystemTime> {
        match self {
            Self::Created => metadata.created(),
            Self::Accessed => metadata.accessed(),
            Self::Modified => metadata.modified(),
        }
    }
}

/// A total order over the members of one set.
pub trait RecordOrdering: Send + Sync {
    /// Compare two records.
    fn compare(&self, a: &FileRecord, b: &FileRecord) -> Ordering;
}

/// A strategy plus direction.
///
/// `descending` reverses only the primary key; the path tie-break stays
/// ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOrder {
    /// Primary key
    pub strategy: SortStrategy,
    /// Reverse the primary key
    pub descending: bool,
}

impl SortOrder {
    /// Create a sort order.
    #[must_use]
    pub fn new(strategy: SortStrategy, descending: bool) -> Self {
        Self {
            strategy,
            descending,
        }
    }

    fn primary(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        match self.strategy {
            SortStrategy::Name => a.path.cmp(&b.path),
            SortStrategy::Size => a.size.cmp(&b.size),
            SortStrategy::CreationTime => a.created.cmp(&b.created),
            SortStrategy::LastReadTime => a.accessed.cmp(&b.accessed),
            SortStrategy::LastWriteTime => a.modified.cmp(&b.modified),
        }
    }

    /// Sort records in place.
    pub fn sort(&self, records: &mut [FileRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl RecordOrdering for SortOrder {
    fn compare(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        let primary = self.primary(a, b);
        let primary = if self.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.path.cmp(&b.path))
    }
}

/// Key for reordering whole sets in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SetKey {
    /// Reclaimable bytes: size times (members - 1)
    #[value(name = "space")]
    SpaceOccupied,
    /// Size of one member
    #[value(name = "size")]
    MemberSize,
    /// Number of members
    #[value(name = "count")]
    MemberCount,
}

/// Registry-level set ordering. Equal keys keep discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOrder {
    /// What to compare
    pub key: SetKey,
    /// Largest first
    pub descending: bool,
}

impl SetOrder {
    /// Create a set order.
    #[must_use]
    pub fn new(key: SetKey, descending: bool) -> Self {
        Self { key, descending }
    }

    /// Compare two sets.
    #[must_use]
    pub fn compare(&self, a: &DuplicateSet, b: &DuplicateSet) -> Ordering {
        let ord = match self.key {
            SetKey::SpaceOccupied => a.space_occupied().cmp(&b.space_occupied()),
            SetKey::MemberSize => a.size().cmp(&b.size()),
            SetKey::MemberCount => a.len().cmp(&b.len()),
        };
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}
