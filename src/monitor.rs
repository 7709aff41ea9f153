//! The watch loop.
//!
//! A [`Monitor`] owns everything a watch session needs: the base directory,
//! the category rules and the compiled filters. The filesystem backend and
//! the interrupt handler both feed one bounded channel; the monitor drains
//! it on the calling thread, handling one event completely before taking the
//! next. That sequential handling is what keeps
//! [`resolve_unique_name`](crate::file_organizer::resolve_unique_name)
//! safe without any locking.

use crate::config::{BaseDirectoryConfig, CompiledFilters};
use crate::file_category::{Category, CategoryRules, split_extension};
use crate::file_organizer::{BootstrapReport, FileOrganizer, OrganizeError, Relocation};
use crate::output::OutputFormatter;
use notify::event::CreateKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};

/// How many undelivered messages the channel holds before the backend blocks.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// A creation reported by the filesystem backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub source_path: PathBuf,
    pub is_directory: bool,
}

impl FileEvent {
    pub fn file(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            is_directory: false,
        }
    }

    pub fn directory(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            is_directory: true,
        }
    }
}

/// Everything the watch loop can receive.
#[derive(Debug)]
pub enum WatchMessage {
    /// Something was created in the base directory.
    Created(FileEvent),
    /// The backend reported a problem; watching continues.
    WatcherError(String),
    /// The operator asked to stop.
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Running,
    Stopped,
}

/// What happened to a single event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Directory creations are not relocated.
    IgnoredDirectory,
    /// The file matched an exclude filter and was left in place.
    Filtered,
    /// Classification and relocation ran.
    Relocated(Relocation),
}

/// Counters for one watch session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub moved: usize,
    pub planned: usize,
    pub unclassified: usize,
    pub failed: usize,
    pub filtered: usize,
    pub directories: usize,
    pub watcher_errors: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &EventOutcome) {
        match outcome {
            EventOutcome::IgnoredDirectory => self.directories += 1,
            EventOutcome::Filtered => self.filtered += 1,
            EventOutcome::Relocated(relocation) => {
                if relocation.moved {
                    self.moved += 1;
                } else if relocation.is_failure() {
                    self.failed += 1;
                } else if relocation.is_unclassified() {
                    self.unclassified += 1;
                } else {
                    self.planned += 1;
                }
            }
        }
    }
}

/// Errors that prevent a watch session from starting.
#[derive(Debug)]
pub enum WatchError {
    /// The category directories could not be prepared.
    Bootstrap(OrganizeError),
    /// The filesystem backend refused the subscription.
    Subscribe {
        path: PathBuf,
        source: notify::Error,
    },
    /// The Ctrl+C / SIGTERM handler could not be installed.
    SignalHandler(ctrlc::Error),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bootstrap(e) => write!(f, "{}", e),
            Self::Subscribe { path, source } => {
                write!(f, "Failed to watch {}: {}", path.display(), source)
            }
            Self::SignalHandler(e) => write!(f, "Failed to install interrupt handler: {}", e),
        }
    }
}

impl std::error::Error for WatchError {}

/// Watches one base directory and sorts every new file into its category.
pub struct Monitor {
    config: BaseDirectoryConfig,
    rules: CategoryRules,
    filters: CompiledFilters,
    dry_run: bool,
    state: MonitorState,
}

impl Monitor {
    pub fn new(
        config: BaseDirectoryConfig,
        rules: CategoryRules,
        filters: CompiledFilters,
    ) -> Self {
        Self {
            config,
            rules,
            filters,
            dry_run: false,
            state: MonitorState::Stopped,
        }
    }

    /// Log planned moves instead of performing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn base_directory(&self) -> &Path {
        self.config.base_directory()
    }

    /// The directory a category's files go to, `None` for unclassified files.
    pub fn destination_for(&self, category: Option<Category>) -> Option<PathBuf> {
        category.map(|category| self.base_directory().join(category.dir_name()))
    }

    /// Creates the category directories under the base directory.
    pub fn bootstrap(&self) -> Result<BootstrapReport, OrganizeError> {
        if self.dry_run {
            OutputFormatter::dry_run_notice("Skipping category directory creation");
            return Ok(BootstrapReport::default());
        }
        FileOrganizer::ensure_categories(self.base_directory(), &Category::all_dir_names())
    }

    /// Classifies and relocates the file behind one event.
    pub fn handle_event(&self, event: &FileEvent) -> EventOutcome {
        if event.is_directory {
            return EventOutcome::IgnoredDirectory;
        }

        let source_path = &event.source_path;
        if !self.filters.should_include(source_path) {
            OutputFormatter::skipped(&format!("Ignored by filters: {}", source_path.display()));
            return EventOutcome::Filtered;
        }

        let file_name = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (_, extension) = split_extension(&file_name);

        OutputFormatter::info(&format!("New file detected: {}", source_path.display()));
        OutputFormatter::plain(&format!("File extension: {}", extension));

        let destination = self.destination_for(self.rules.classify(&file_name));
        let relocation = if self.dry_run {
            FileOrganizer::preview(source_path, destination.as_deref())
        } else {
            FileOrganizer::relocate(source_path, destination.as_deref())
        };

        EventOutcome::Relocated(relocation)
    }

    /// Drains `events` until an interrupt arrives or every sender is gone.
    ///
    /// Messages queued behind the interrupt are not handled.
    pub fn run(&mut self, events: Receiver<WatchMessage>) -> RunSummary {
        self.state = MonitorState::Running;
        let mut summary = RunSummary::default();

        while self.state == MonitorState::Running {
            match events.recv() {
                Ok(WatchMessage::Created(event)) => {
                    let outcome = self.handle_event(&event);
                    summary.record(&outcome);
                }
                Ok(WatchMessage::WatcherError(reason)) => {
                    OutputFormatter::error(&format!("Watcher error: {}", reason));
                    summary.watcher_errors += 1;
                }
                Ok(WatchMessage::Interrupt) | Err(_) => self.state = MonitorState::Stopped,
            }
        }

        summary
    }

    /// Runs a full watch session until Ctrl+C or SIGTERM.
    ///
    /// Creates the category directories, subscribes to the base directory
    /// (non-recursively, so moves into category directories are not seen
    /// again) and handles events until interrupted.
    pub fn watch(&mut self) -> Result<RunSummary, WatchError> {
        self.bootstrap().map_err(WatchError::Bootstrap)?;

        let (tx, rx) = mpsc::sync_channel(EVENT_CHANNEL_CAPACITY);
        let mut watcher = subscribe(self.base_directory(), tx.clone())?;

        ctrlc::set_handler(move || {
            let _ = tx.send(WatchMessage::Interrupt);
        })
        .map_err(WatchError::SignalHandler)?;

        OutputFormatter::info(&format!(
            "Monitoring directory: {}",
            self.base_directory().display()
        ));

        let summary = self.run(rx);

        let _ = watcher.unwatch(self.base_directory());
        drop(watcher);
        OutputFormatter::plain("Monitoring stopped.");

        Ok(summary)
    }
}

/// Starts the filesystem backend on `base_directory`, forwarding creations to `tx`.
///
/// The subscription lasts as long as the returned watcher is alive.
pub fn subscribe(
    base_directory: &Path,
    tx: SyncSender<WatchMessage>,
) -> Result<RecommendedWatcher, WatchError> {
    let subscribe_error = |source| WatchError::Subscribe {
        path: base_directory.to_path_buf(),
        source,
    };

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        for message in translate(result) {
            if tx.send(message).is_err() {
                break;
            }
        }
    })
    .map_err(subscribe_error)?;

    watcher
        .watch(base_directory, RecursiveMode::NonRecursive)
        .map_err(subscribe_error)?;

    Ok(watcher)
}

/// Turns one backend notification into loop messages. Only creations survive.
fn translate(result: notify::Result<Event>) -> Vec<WatchMessage> {
    match result {
        Ok(Event {
            kind: EventKind::Create(kind),
            paths,
            ..
        }) => paths
            .into_iter()
            .map(|path| {
                let is_directory = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    _ => path.is_dir(),
                };
                WatchMessage::Created(FileEvent {
                    source_path: path,
                    is_directory,
                })
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(e) => vec![WatchMessage::WatcherError(e.to_string())],
    }
}
