//! Scan and action configuration.
//!
//! [`ScanConfiguration`] is built once per run, validated, and passed by
//! reference to every component. Persistent defaults live in [`Settings`],
//! which are layered with figment: built-in defaults, then `config.toml` in
//! the platform config directory, then `RMDUPES_*` environment variables.
//! Command-line flags are applied on top by the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::RemovalMode;
use crate::duplicates::{SortOrder, SortStrategy};

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Environment variable prefix for settings.
pub const ENV_PREFIX: &str = "RMDUPES_";

/// Errors in the requested configuration. Raised before any scan starts.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// No action flag was given.
    #[error("One of --summarise, --delete or --link must be given")]
    MissingAction,

    /// More than one action flag was given.
    #[error("The --summarise, --delete and --link switches are mutually exclusive")]
    ConflictingActions,

    /// More than one sort flag was given.
    #[error("The --name, --by-size, --creation-time, --last-read-time and --last-write-time switches are mutually exclusive")]
    ConflictingSort,

    /// The size bounds are inverted.
    #[error("Minimum size {min} is greater than maximum size {max}")]
    InvalidSizeRange {
        /// Lower bound
        min: u64,
        /// Upper bound
        max: u64,
    },

    /// The hashing pool needs at least one thread.
    #[error("I/O thread count must be at least 1")]
    InvalidThreadCount,

    /// The sort order needs a timestamp this platform cannot provide.
    #[error("Sorting by {field} is not supported for {path}: {source}")]
    TimestampUnsupported {
        /// Human-readable timestamp name
        field: &'static str,
        /// Path that was probed
        path: PathBuf,
        /// Platform error
        #[source]
        source: io::Error,
    },
}

/// Immutable settings for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfiguration {
    /// Descend into subdirectories
    pub recurse: bool,
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Smallest file considered, inclusive
    pub min_size: u64,
    /// Largest file considered, inclusive
    pub max_size: u64,
    /// Skip hidden files and directories
    pub skip_hidden: bool,
    /// Order of members within each set
    pub sort: SortOrder,
    /// Threads used for content hashing
    pub io_threads: usize,
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            recurse: true,
            follow_symlinks: false,
            min_size: 0,
            max_size: u64::MAX,
            skip_hidden: false,
            sort: SortOrder::default(),
            io_threads: DEFAULT_IO_THREADS,
        }
    }
}

impl ScanConfiguration {
    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `min_size > max_size` or `io_threads` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size > self.max_size {
            return Err(ConfigError::InvalidSizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.io_threads == 0 {
            return Err(ConfigError::InvalidThreadCount);
        }
        Ok(())
    }

    /// Verify that the timestamp needed by the sort order can be read.
    ///
    /// Probes the root's own metadata. Strategies that need no timestamp
    /// always pass.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TimestampUnsupported`] if the platform does not
    /// supply the field.
    pub fn check_timestamp_support(&self, root: &Path) -> Result<(), ConfigError> {
        let Some(field) = self.sort.strategy.required_timestamp() else {
            return Ok(());
        };
        let probe = fs::metadata(root).and_then(|m| field.read(&m));
        match probe {
            Ok(_) => Ok(()),
            Err(source) => Err(ConfigError::TimestampUnsupported {
                field: field.label(),
                path: root.to_path_buf(),
                source,
            }),
        }
    }
}

/// What to do with the duplicate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Report counts only
    Summary,
    /// Remove all but one member of each set
    Delete,
    /// Replace all but one member with a symlink to the keeper
    Link,
}

impl Action {
    /// Pick the action from the three mutually exclusive flags.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAction`] if none is set and
    /// [`ConfigError::ConflictingActions`] if more than one is.
    pub fn from_flags(summarise: bool, delete: bool, link: bool) -> Result<Self, ConfigError> {
        match (summarise, delete, link) {
            (true, false, false) => Ok(Self::Summary),
            (false, true, false) => Ok(Self::Delete),
            (false, false, true) => Ok(Self::Link),
            (false, false, false) => Err(ConfigError::MissingAction),
            _ => Err(ConfigError::ConflictingActions),
        }
    }

    /// Whether the action modifies the file system.
    #[must_use]
    pub fn is_destructive(self) -> bool {
        !matches!(self, Self::Summary)
    }
}

/// Sort flags as given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortFlags {
    /// `--name`
    pub name: bool,
    /// `--creation-time`
    pub creation_time: bool,
    /// `--last-read-time`
    pub last_read_time: bool,
    /// `--last-write-time`
    pub last_write_time: bool,
    /// `--by-size`
    pub size: bool,
}

impl SortFlags {
    /// Resolve to one strategy, or `None` when no flag was given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingSort`] if more than one flag is set.
    pub fn resolve(self) -> Result<Option<SortStrategy>, ConfigError> {
        let chosen: Vec<SortStrategy> = [
            (self.name, SortStrategy::Name),
            (self.creation_time, SortStrategy::CreationTime),
            (self.last_read_time, SortStrategy::LastReadTime),
            (self.last_write_time, SortStrategy::LastWriteTime),
            (self.size, SortStrategy::Size),
        ]
        .into_iter()
        .filter_map(|(set, strategy)| set.then_some(strategy))
        .collect();

        match chosen.as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(*one)),
            _ => Err(ConfigError::ConflictingSort),
        }
    }
}

/// Settings for the action phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionConfiguration {
    /// The action to run
    pub action: Action,
    /// Keep the first member without asking
    pub no_prompt: bool,
    /// How removed members are disposed of
    pub removal: RemovalMode,
}

impl ActionConfiguration {
    /// Create an action configuration with permanent removal.
    #[must_use]
    pub fn new(action: Action, no_prompt: bool) -> Self {
        Self {
            action,
            no_prompt,
            removal: RemovalMode::Permanent,
        }
    }

    /// Set the removal mode.
    #[must_use]
    pub fn with_removal(mut self, removal: RemovalMode) -> Self {
        self.removal = removal;
        self
    }
}

/// Persistent user defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default sort strategy
    pub sort: SortStrategy,
    /// Sort descending by default
    pub descending: bool,
    /// Skip hidden entries by default
    pub skip_hidden: bool,
    /// Follow symlinks by default
    pub follow_symlinks: bool,
    /// Hashing threads
    pub io_threads: usize,
    /// Move removed files to the trash instead of unlinking
    pub trash: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sort: SortStrategy::Name,
            descending: false,
            skip_hidden: false,
            follow_symlinks: false,
            io_threads: DEFAULT_IO_THREADS,
            trash: false,
        }
    }
}

impl Settings {
    /// Load settings from the platform config file and environment.
    ///
    /// Any failure is logged and the built-in defaults are used.
    pub fn load() -> Self {
        match Self::load_from(Self::config_path().as_deref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::debug!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Layer defaults, an optional TOML file and `RMDUPES_*` variables.
    ///
    /// # Errors
    ///
    /// Returns a figment error if a source is malformed.
    pub fn load_from(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            log::debug!("Reading settings from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX)).extract()
    }

    /// Save the settings to the platform config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be determined or written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the settings to a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The platform-specific `config.toml` location.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "rmdupes", "rmdupes")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
