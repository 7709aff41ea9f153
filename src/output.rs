//! Output formatting and styling module.
//!
//! Provides a centralized interface for all console output of the watcher.
//! Every line carries a local `HH:MM:SS` timestamp so a long-running watch
//! session reads as a log.

use chrono::Local;
use colored::*;

/// Manages all console output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Skip messages (dimmed with ·) for files deliberately left in place
pub struct OutputFormatter;

impl OutputFormatter {
    /// Enables or disables ANSI colors for every subsequent line.
    pub fn set_color(enabled: bool) {
        if enabled {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
    }

    fn timestamp() -> ColoredString {
        format!("[{}]", Local::now().format("%H:%M:%S")).dimmed()
    }

    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use autosort::output::OutputFormatter;
    /// OutputFormatter::success("Moved file: a.pdf");
    /// ```
    pub fn success(message: &str) {
        println!("{} {} {}", Self::timestamp(), "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use autosort::output::OutputFormatter;
    /// OutputFormatter::error("Failed to move file");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {} {}", Self::timestamp(), "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {} {}", Self::timestamp(), "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use autosort::output::OutputFormatter;
    /// OutputFormatter::info("Monitoring directory: /home/user/Downloads");
    /// ```
    pub fn info(message: &str) {
        println!("{} {}", Self::timestamp(), message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{} {}", Self::timestamp(), message);
    }

    /// Prints a note about a file that was intentionally left untouched.
    pub fn skipped(message: &str) {
        println!("{} {} {}", Self::timestamp(), "·".dimmed(), message.dimmed());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!(
            "{} {}",
            Self::timestamp(),
            format!("[DRY RUN] {}", message).yellow()
        );
    }
}
