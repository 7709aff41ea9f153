//! autosort - keep a directory tidy as files arrive
//!
//! This library watches a base directory for newly created files and moves
//! each one into a category subdirectory (Documents, Applications, Photos,
//! Videos, Archive, Torrents) chosen by its extension, renaming on collision
//! so nothing is overwritten.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod monitor;
pub mod output;
pub mod picker;

pub use config::{BaseDirectoryConfig, CompiledFilters, ConfigError, WatchRules};
pub use file_category::{Category, CategoryRules};
pub use file_organizer::{FileOrganizer, Relocation, RelocationPlan, resolve_unique_name};
pub use monitor::{FileEvent, Monitor, RunSummary, WatchMessage};

pub use cli::{Cli, run_cli};
