//! File actions module.
//!
//! This module provides functionality for:
//! - Permanent or trash removal with re-verification ([`delete`])
//! - Replacing a duplicate with a symlink to its keeper ([`link`])
//! - Running an action over every set of a registry ([`executor`])
//! - Interactive keeper selection ([`prompt`])
//!
//! ```no_run
//! use rmdupes::actions::{ActionExecutor, FirstMember};
//! use rmdupes::config::{Action, ActionConfiguration};
//! use rmdupes::duplicates::DuplicateSetRegistry;
//!
//! # let registry = DuplicateSetRegistry::default();
//! let executor = ActionExecutor::new(ActionConfiguration::new(Action::Delete, true));
//! let report = executor.execute(&registry, &mut FirstMember);
//! println!("{}", report.summary());
//! ```

pub mod delete;
pub mod executor;
pub mod link;
pub mod prompt;

pub use delete::{
    delete_to_trash, permanent_delete, remove_file, ActionError, FileSnapshot, RemovalMode,
    RemovalResult,
};
pub use executor::{ActionExecutor, ActionReport, FirstMember, KeeperChooser};
pub use link::{replace_with_link, LinkResult};
pub use prompt::StdinPrompt;
