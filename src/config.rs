//! Watcher configuration.
//!
//! Two pieces of configuration drive a watch session:
//!
//! - The base directory, stored as a single absolute path in a plain-text
//!   file (`base_directory.txt` by default). It is written by the `select`
//!   command and read once when `watch` starts.
//! - Optional watch rules stored in TOML. They control whether extension
//!   matching is case-sensitive and which newly created files are ignored.
//!
//! # Watch Rules Format
//!
//! ```toml
//! match_case = false
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["desktop.ini"]
//! patterns = ["*.part"]
//! extensions = ["crdownload"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the base directory file, relative to the working directory.
pub const DEFAULT_BASE_DIRECTORY_FILE: &str = "base_directory.txt";

/// Errors that can occur during configuration loading and filtering.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// The base directory file exists but holds no path.
    EmptyBaseDirectory(PathBuf),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
    /// IO error while writing configuration.
    WriteFailed {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying error message.
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Path file {} not found", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::EmptyBaseDirectory(path) => {
                write!(
                    f,
                    "Path file {} does not contain a directory",
                    path.display()
                )
            }
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(
                    f,
                    "Invalid glob pattern '{}': expected *.ext or dir/**",
                    pattern
                )
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
            ConfigError::WriteFailed { path, reason } => {
                write!(f, "Failed to write {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// The directory that is both watched and the parent of every category directory.
///
/// Loaded once at startup and passed explicitly to whoever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectoryConfig {
    base_directory: PathBuf,
}

impl BaseDirectoryConfig {
    /// Wraps an already known base directory.
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
        }
    }

    /// Reads the base directory from a plain-text path file.
    ///
    /// The whole file is read and surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist,
    /// `ConfigError::EmptyBaseDirectory` if it holds only whitespace and
    /// `ConfigError::IoError` if it cannot be read.
    pub fn load(path_file: &Path) -> Result<Self, ConfigError> {
        if !path_file.exists() {
            return Err(ConfigError::ConfigNotFound(path_file.to_path_buf()));
        }

        let content =
            fs::read_to_string(path_file).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseDirectory(path_file.to_path_buf()));
        }

        Ok(Self::new(trimmed))
    }

    /// Writes the base directory to a plain-text path file, replacing its contents.
    pub fn save(&self, path_file: &Path) -> Result<(), ConfigError> {
        fs::write(path_file, self.base_directory.to_string_lossy().as_bytes()).map_err(|e| {
            ConfigError::WriteFailed {
                path: path_file.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }

    /// Returns the base directory.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }
}

/// Rules that shape a watch session, deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchRules {
    /// Compare extensions exactly as written (`photo.JPG` stays unclassified).
    #[serde(default)]
    pub match_case: bool,

    /// Filters deciding which new files are ignored.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRules {
    /// Whether to process hidden files (starting with "."). Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for excluding files from relocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "desktop.ini", "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, without the dot (e.g., "crdownload", "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl WatchRules {
    /// Load watch rules from a file, with fallback to defaults.
    ///
    /// Attempts to load rules in the following order:
    /// 1. If `rules_path` is provided, load from that file
    /// 2. Look for `.autosortrc.toml` in the current directory
    /// 3. Look for `~/.config/autosort/config.toml` in home directory
    /// 4. Fall back to default rules
    ///
    /// # Errors
    ///
    /// Returns an error if a rules file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(rules_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = rules_path {
            return Self::load_from_file(path);
        }

        let local_rules = PathBuf::from(".autosortrc.toml");
        if local_rules.exists() {
            return Self::load_from_file(&local_rules);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_rules = PathBuf::from(home)
                .join(".config")
                .join("autosort")
                .join("config.toml");
            if home_rules.exists() {
                return Self::load_from_file(&home_rules);
            }
        }

        Ok(Self::default())
    }

    /// Load rules from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::parse(&content)
    }

    /// Parse rules from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the filter section into structures ready for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Compiled filter structures for matching newly created files.
///
/// Glob and regex patterns are parsed once up front instead of on every event.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if a new file should be relocated (not filtered out).
    ///
    /// Patterns are matched against the file name only, since the watch is
    /// not recursive. Checks are performed in this order:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter - if hidden and disabled, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. File extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_any(&self.include_patterns, &file_name) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.matches_any(&self.exclude_patterns, &file_name) {
            return false;
        }

        if self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
        {
            return false;
        }

        true
    }

    fn matches_any(&self, patterns: &[Pattern], file_name: &str) -> bool {
        patterns.iter().any(|pattern| pattern.matches(file_name))
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}
