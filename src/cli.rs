//! Command-line interface module for autosort.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing
//! - Loading the base directory and watch rules
//! - Starting the watch loop
//! - Selecting and saving the base directory

use crate::config::{BaseDirectoryConfig, DEFAULT_BASE_DIRECTORY_FILE, WatchRules};
use crate::file_category::CategoryRules;
use crate::monitor::{Monitor, RunSummary};
use crate::output::OutputFormatter;
use crate::picker::{DirectoryPicker, Preselected, PromptPicker, select_base_directory};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "autosort",
    version,
    about = "Watch a directory and move new files into category subdirectories."
)]
pub struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch the base directory and sort every new file until interrupted.
    Watch(WatchArgs),
    /// Choose the base directory and save it for later runs.
    Select(SelectArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// File holding the base directory path.
    #[arg(long, default_value = DEFAULT_BASE_DIRECTORY_FILE, value_name = "FILE")]
    pub config: PathBuf,

    /// TOML watch rules (case matching and file filters).
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Log where files would go without moving anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Directory to use. Prompts when omitted.
    #[arg(value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// File the chosen path is written to.
    #[arg(long, default_value = DEFAULT_BASE_DIRECTORY_FILE, value_name = "FILE")]
    pub config: PathBuf,
}

/// Runs the parsed command line.
///
/// # Examples
///
/// ```no_run
/// use autosort::cli::{Cli, run_cli};
/// use clap::Parser;
///
/// let cli = Cli::parse_from(["autosort", "watch", "--dry-run"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), String> {
    OutputFormatter::set_color(!cli.no_color);

    match cli.command {
        Command::Watch(args) => watch_directory(&args).map(|_| ()),
        Command::Select(args) => {
            let mut picker: Box<dyn DirectoryPicker> = match &args.path {
                Some(path) => Box::new(Preselected(path.clone())),
                None => Box::new(PromptPicker::stdio()),
            };
            select_directory(picker.as_mut(), &args)
        }
    }
}

/// Loads the configuration and runs a watch session until interrupted.
///
/// This function:
/// 1. Reads the base directory from the path file (missing file is fatal)
/// 2. Loads and compiles the watch rules
/// 3. Creates the category directories
/// 4. Relocates every new file until Ctrl+C
pub fn watch_directory(args: &WatchArgs) -> Result<RunSummary, String> {
    let config = BaseDirectoryConfig::load(&args.config).map_err(|e| format!("{}. Exiting.", e))?;

    let rules = WatchRules::load(args.rules.as_deref())
        .map_err(|e| format!("Error loading watch rules: {}", e))?;
    let filters = rules
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    if rules.match_case {
        OutputFormatter::warning("Extension matching is case-sensitive");
    }

    let mut monitor = Monitor::new(
        config,
        CategoryRules::with_match_case(rules.match_case),
        filters,
    )
    .with_dry_run(args.dry_run);

    let summary = monitor.watch().map_err(|e| e.to_string())?;
    print_summary(&summary, args.dry_run);
    Ok(summary)
}

/// Asks `picker` for the base directory and saves it.
pub fn select_directory(picker: &mut dyn DirectoryPicker, args: &SelectArgs) -> Result<(), String> {
    let config = select_base_directory(picker, &args.config).map_err(|e| e.to_string())?;

    OutputFormatter::success(&format!(
        "Base directory path saved to {}: {}",
        args.config.display(),
        config.base_directory().display()
    ));
    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let moved = if dry_run {
        format!("{} planned", summary.planned)
    } else {
        format!("{} moved", summary.moved)
    };

    OutputFormatter::plain(&format!(
        "Session: {}, {} unclassified, {} filtered, {} failed",
        moved, summary.unclassified, summary.filtered, summary.failed
    ));

    if summary.failed > 0 {
        OutputFormatter::warning("Some files could not be moved. Please review errors above.");
    }
}
