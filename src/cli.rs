//! Command-line interface definitions for rm-dupes.
//!
//! All flags are parsed with the clap derive API and then folded together
//! with the persisted [`Settings`] into a [`ScanConfiguration`] and an
//! [`ActionConfiguration`]. Flags always win over settings.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate counts for two directories
//! rm-dupes -m ~/Downloads ~/Documents
//!
//! # List sets largest-first with sizes, then delete interactively
//! rm-dupes -d -S -b --descending ~/Pictures
//!
//! # Replace duplicates with symlinks, keeping the oldest copy
//! rm-dupes -l -N -M ~/Music
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::actions::RemovalMode;
use crate::config::{
    Action, ActionConfiguration, ConfigError, ScanConfiguration, Settings, SortFlags,
};
use crate::duplicates::{SetKey, SetOrder, SortOrder};
use crate::output::ListingOptions;

/// Find duplicate files and summarise, delete or link them.
///
/// Files are grouped by size first, and only files sharing a size are read
/// and hashed (BLAKE3). Exactly one of --summarise, --delete or --link is
/// required.
#[derive(Debug, Parser)]
#[command(name = "rm-dupes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to search
    #[arg(value_name = "DIR", required = true)]
    pub roots: Vec<PathBuf>,

    /// Only search the top level of each directory
    #[arg(long)]
    pub no_recurse: bool,

    /// Follow symbolic links during the scan
    #[arg(short = 's', long = "symlinks")]
    pub follow_symlinks: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long = "minsize", value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long = "maxsize", value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Skip hidden files and directories
    #[arg(long = "nohidden")]
    pub skip_hidden: bool,

    /// Show the size of each file in the listing
    #[arg(short = 'S', long = "size")]
    pub show_size: bool,

    /// Show the last-write time of each file in the listing
    #[arg(short = 't', long = "time")]
    pub show_time: bool,

    /// List sets in reverse order
    #[arg(long)]
    pub reverse: bool,

    /// Reorder sets largest first by reclaimable space, member size or
    /// member count
    #[arg(long, value_enum, value_name = "KEY")]
    pub set_order: Option<SetKey>,

    /// Suppress progress output and logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report the number of duplicates and the space they occupy
    #[arg(short = 'm', long)]
    pub summarise: bool,

    /// Delete all but one file in each set
    #[arg(short, long)]
    pub delete: bool,

    /// Replace all but one file in each set with a symbolic link to it
    #[arg(short, long)]
    pub link: bool,

    /// Keep the first file of each set without asking
    #[arg(short = 'N', long = "noprompt")]
    pub no_prompt: bool,

    /// Order set members by creation time
    #[arg(short = 'c', long)]
    pub creation_time: bool,

    /// Order set members by last read time
    #[arg(short = 'a', long)]
    pub last_read_time: bool,

    /// Order set members by last write time
    #[arg(short = 'M', long)]
    pub last_write_time: bool,

    /// Order set members by path name (default)
    #[arg(short = 'n', long)]
    pub name: bool,

    /// Order set members by size
    #[arg(short = 'b', long)]
    pub by_size: bool,

    /// Reverse the member ordering
    #[arg(long)]
    pub descending: bool,

    /// Move removed files to the system trash instead of unlinking them
    #[arg(long)]
    pub trash: bool,

    /// Store the sort, filter, thread and trash options of this run as
    /// defaults for later runs
    #[arg(long)]
    pub save_settings: bool,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Print the sets and summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Output errors as JSON to stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// The sort switches as given.
    #[must_use]
    pub fn sort_flags(&self) -> SortFlags {
        SortFlags {
            name: self.name,
            creation_time: self.creation_time,
            last_read_time: self.last_read_time,
            last_write_time: self.last_write_time,
            size: self.by_size,
        }
    }

    /// Build the scan configuration, falling back to `settings` for
    /// anything not given on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on conflicting sort flags or an invalid
    /// size range or thread count.
    pub fn scan_configuration(
        &self,
        settings: &Settings,
    ) -> Result<ScanConfiguration, ConfigError> {
        let effective = self.effective_settings(settings)?;
        let config = ScanConfiguration {
            recurse: !self.no_recurse,
            follow_symlinks: effective.follow_symlinks,
            min_size: self.min_size.unwrap_or(0),
            max_size: self.max_size.unwrap_or(u64::MAX),
            skip_hidden: effective.skip_hidden,
            sort: SortOrder::new(effective.sort, effective.descending),
            io_threads: effective.io_threads,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the action configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] unless exactly one action flag is set.
    pub fn action_configuration(
        &self,
        settings: &Settings,
    ) -> Result<ActionConfiguration, ConfigError> {
        let action = Action::from_flags(self.summarise, self.delete, self.link)?;
        let removal = RemovalMode::from_trash_flag(self.trash || settings.trash);
        Ok(ActionConfiguration::new(action, self.no_prompt).with_removal(removal))
    }

    /// The settings this run would persist with `--save-settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on conflicting sort flags.
    pub fn effective_settings(&self, settings: &Settings) -> Result<Settings, ConfigError> {
        Ok(Settings {
            sort: self.sort_flags().resolve()?.unwrap_or(settings.sort),
            descending: self.descending || settings.descending,
            skip_hidden: self.skip_hidden || settings.skip_hidden,
            follow_symlinks: self.follow_symlinks || settings.follow_symlinks,
            io_threads: self.io_threads.unwrap_or(settings.io_threads),
            trash: self.trash || settings.trash,
        })
    }

    /// Set ordering requested with `--set-order`, largest first.
    #[must_use]
    pub fn set_order(&self) -> Option<SetOrder> {
        self.set_order.map(|key| SetOrder::new(key, true))
    }

    /// Listing columns and direction.
    #[must_use]
    pub fn listing_options(&self) -> ListingOptions {
        ListingOptions {
            show_size: self.show_size,
            show_time: self.show_time,
            reverse: self.reverse,
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports the following formats:
/// - Plain bytes: "1024", "1024B"
/// - Kilobytes: "1KB", "1K" (1000 bytes), "1KiB" (1024 bytes)
/// - Megabytes: "1MB", "1M" (1000^2 bytes), "1MiB" (1024^2 bytes)
/// - Gigabytes: "1GB", "1G" (1000^3 bytes), "1GiB" (1024^3 bytes)
/// - Terabytes: "1TB", "1T" (1000^4 bytes), "1TiB" (1024^4 bytes)
///
/// Suffixes are case-insensitive.
///
/// # Errors
///
/// Returns an error message if the string cannot be parsed.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
