//! Output formatters for duplicate scan results.
//!
//! This module provides two output formats:
//! - Plain text listing and summary for the console ([`text`])
//! - JSON for automation and scripting ([`json`])
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::config::ScanConfiguration;
//! use rmdupes::duplicates::DuplicateFinder;
//! use rmdupes::output::text::{write_sets, write_summary, ListingOptions};
//! use rmdupes::progress::QuietSink;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(ScanConfiguration::default());
//! let (registry, summary) = finder.scan(&[PathBuf::from(".")], &QuietSink).unwrap();
//!
//! let mut stdout = std::io::stdout();
//! write_sets(&mut stdout, &registry, ListingOptions::default()).unwrap();
//! write_summary(&mut stdout, &summary).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::JsonReport;
pub use text::ListingOptions;
