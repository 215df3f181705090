//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Scan orchestration with size-then-hash fingerprinting ([`finder`])
//! - Duplicate sets and the registry that owns them ([`groups`])
//! - Member and set ordering ([`sort`])

pub mod finder;
pub mod groups;
pub mod sort;

pub use finder::{DuplicateFinder, FinderError, ScanStatistics, ScanSummary};
pub use groups::{DuplicateSet, DuplicateSetRegistry, Fingerprint, InsertOutcome, RegistryBuilder};
pub use sort::{RecordOrdering, SetKey, SetOrder, SortOrder, SortStrategy, TimestampField};
