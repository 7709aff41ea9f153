/// File relocation into category directories.
///
/// This module moves newly detected files into their category subdirectory of
/// the base directory. It creates the destination directory when needed, picks
/// a collision-free file name, and reports every outcome as a value so one bad
/// file never stops the caller.
use crate::output::OutputFormatter;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The source path has no file name component to carry over.
    MissingFileName { path: PathBuf },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move file {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::MissingFileName { path } => {
                write!(f, "Path {} has no file name", path.display())
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Returns a file name that does not yet exist in `directory`.
///
/// If `desired_name` is free it is returned unchanged, otherwise `" (1)"`,
/// `" (2)"`, ... is inserted before the extension until a free name is found.
/// A directory that does not exist is treated as empty. The name is handled as
/// an [`OsStr`], so names that are not valid UTF-8 keep their exact bytes.
///
/// The check and the later move are separate filesystem operations, so the
/// result only holds while nothing else writes to `directory`. The watch loop
/// processes events one at a time, which keeps that true for a single watcher.
///
/// # Examples
///
/// ```
/// use autosort::file_organizer::resolve_unique_name;
/// use std::path::Path;
///
/// let name = resolve_unique_name(Path::new("/no/such/dir"), "a.txt");
/// assert_eq!(name, "a.txt");
/// ```
pub fn resolve_unique_name(directory: &Path, desired_name: impl AsRef<OsStr>) -> OsString {
    let desired_name = desired_name.as_ref();
    let (stem, extension) = split_name(desired_name);
    let mut candidate = desired_name.to_os_string();
    let mut counter: u64 = 1;

    while entry_exists(&directory.join(&candidate)) {
        candidate = stem.to_os_string();
        candidate.push(format!(" ({})", counter));
        if let Some(extension) = extension {
            candidate.push(".");
            candidate.push(extension);
        }
        counter += 1;
    }

    candidate
}

/// Splits a file name at its last dot, leaving leading dots in the stem.
///
/// Same rule as [`split_extension`](crate::file_category::split_extension),
/// but the extension comes back without its dot.
fn split_name(file_name: &OsStr) -> (&OsStr, Option<&OsStr>) {
    let bytes = file_name.as_encoded_bytes();
    let leading_dots = bytes.iter().take_while(|b| **b == b'.').count();
    if !bytes[leading_dots..].contains(&b'.') {
        return (file_name, None);
    }

    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(extension)) => (stem, Some(extension)),
        _ => (file_name, None),
    }
}

/// True if anything, including a dangling symlink, occupies `path`.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Where a single file is going to end up.
///
/// Computed fresh for every event and dropped once the move was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationPlan {
    /// The file as it was detected.
    pub source_path: PathBuf,
    /// The category directory receiving the file.
    pub destination_directory: PathBuf,
    /// The collision-free name inside `destination_directory`.
    pub destination_file_name: OsString,
    /// `destination_directory` joined with `destination_file_name`.
    pub destination_path: PathBuf,
}

impl RelocationPlan {
    /// Builds the plan for moving `source_path` into `destination_directory`.
    pub fn new(source_path: &Path, destination_directory: &Path) -> OrganizeResult<Self> {
        let file_name = source_path
            .file_name()
            .ok_or_else(|| OrganizeError::MissingFileName {
                path: source_path.to_path_buf(),
            })?;

        let destination_file_name = resolve_unique_name(destination_directory, file_name);
        let destination_path = destination_directory.join(&destination_file_name);

        Ok(Self {
            source_path: source_path.to_path_buf(),
            destination_directory: destination_directory.to_path_buf(),
            destination_file_name,
            destination_path,
        })
    }
}

/// The outcome of one relocation attempt.
#[derive(Debug)]
pub struct Relocation {
    /// The file that was considered.
    pub source_path: PathBuf,
    /// True only if the file now lives at `destination_path`.
    pub moved: bool,
    /// The chosen destination, if one was computed.
    pub destination_path: Option<PathBuf>,
    /// What went wrong, if anything.
    pub error: Option<OrganizeError>,
}

impl Relocation {
    fn unclassified(source_path: &Path) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            moved: false,
            destination_path: None,
            error: None,
        }
    }

    fn failed(source_path: &Path, destination_path: Option<PathBuf>, error: OrganizeError) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            moved: false,
            destination_path,
            error: Some(error),
        }
    }

    /// Returns true if the file was deliberately left in place.
    pub fn is_unclassified(&self) -> bool {
        !self.moved && self.destination_path.is_none() && self.error.is_none()
    }

    /// Returns true if the attempt failed.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Outcome of creating the category directories.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    /// Directories that were created.
    pub created: Vec<PathBuf>,
    /// Directories that already existed.
    pub existing: Vec<PathBuf>,
    /// Directories that could not be created, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl BootstrapReport {
    /// Returns true if every category directory is available.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Moves files into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Creates every category directory under `base_path` that is missing.
    ///
    /// A failure for one category is logged and recorded; the remaining
    /// categories are still processed.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidBasePath` only when `base_path` itself
    /// is not an existing directory.
    pub fn ensure_categories(
        base_path: &Path,
        category_names: &[&str],
    ) -> OrganizeResult<BootstrapReport> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path is not an existing directory",
                ),
            });
        }

        let mut report = BootstrapReport::default();
        for name in category_names {
            let folder_path = base_path.join(name);

            if folder_path.is_dir() {
                OutputFormatter::plain(&format!(
                    "Folder already exists: {}",
                    folder_path.display()
                ));
                report.existing.push(folder_path);
                continue;
            }

            match fs::create_dir_all(&folder_path) {
                Ok(()) => {
                    OutputFormatter::success(&format!(
                        "Successfully created: {}",
                        folder_path.display()
                    ));
                    report.created.push(folder_path);
                }
                Err(e) => {
                    OutputFormatter::error(&format!(
                        "Error creating folder {}: {}",
                        folder_path.display(),
                        e
                    ));
                    report.failed.push((folder_path, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Moves `source_path` into `destination_directory` under a collision-free name.
    ///
    /// `None` or an empty path means the file is unclassified: nothing is
    /// touched and the result carries no error. Otherwise the destination
    /// directory is created if needed and the file is renamed, falling back to
    /// copy-then-delete across filesystems. Failures are returned inside the
    /// [`Relocation`] and leave the source where it was.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use autosort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::relocate(
    ///     Path::new("/home/user/Downloads/photo.jpg"),
    ///     Some(Path::new("/home/user/Downloads/Photos")),
    /// );
    /// if let Some(e) = &result.error {
    ///     eprintln!("{}", e);
    /// }
    /// ```
    pub fn relocate(source_path: &Path, destination_directory: Option<&Path>) -> Relocation {
        let Some(destination_directory) = classified(destination_directory) else {
            OutputFormatter::skipped(&format!(
                "Left in place (unclassified): {}",
                source_path.display()
            ));
            return Relocation::unclassified(source_path);
        };

        if let Err(e) = fs::create_dir_all(destination_directory) {
            let error = OrganizeError::DirectoryCreationFailed {
                path: destination_directory.to_path_buf(),
                source: e,
            };
            OutputFormatter::error(&error.to_string());
            return Relocation::failed(source_path, None, error);
        }

        let plan = match RelocationPlan::new(source_path, destination_directory) {
            Ok(plan) => plan,
            Err(error) => {
                OutputFormatter::error(&error.to_string());
                return Relocation::failed(source_path, None, error);
            }
        };

        OutputFormatter::plain(&format!("Moving file to: {}", plan.destination_path.display()));

        match move_file(&plan.source_path, &plan.destination_path) {
            Ok(()) => {
                OutputFormatter::success(&format!(
                    "Moved file: {} to {}",
                    plan.source_path.display(),
                    plan.destination_path.display()
                ));
                Relocation {
                    source_path: plan.source_path,
                    moved: true,
                    destination_path: Some(plan.destination_path),
                    error: None,
                }
            }
            Err(e) => {
                let error = OrganizeError::FileMoveFailure {
                    source: plan.source_path.clone(),
                    destination: plan.destination_path.clone(),
                    source_error: e,
                };
                OutputFormatter::error(&error.to_string());
                Relocation::failed(&plan.source_path, Some(plan.destination_path), error)
            }
        }
    }

    /// Computes where `source_path` would go without touching the filesystem.
    pub fn preview(source_path: &Path, destination_directory: Option<&Path>) -> Relocation {
        let Some(destination_directory) = classified(destination_directory) else {
            OutputFormatter::dry_run_notice(&format!(
                "Would leave in place (unclassified): {}",
                source_path.display()
            ));
            return Relocation::unclassified(source_path);
        };

        match RelocationPlan::new(source_path, destination_directory) {
            Ok(plan) => {
                OutputFormatter::dry_run_notice(&format!(
                    "Would move {} to {}",
                    plan.source_path.display(),
                    plan.destination_path.display()
                ));
                Relocation {
                    source_path: plan.source_path,
                    moved: false,
                    destination_path: Some(plan.destination_path),
                    error: None,
                }
            }
            Err(error) => {
                OutputFormatter::error(&error.to_string());
                Relocation::failed(source_path, None, error)
            }
        }
    }
}

fn classified(destination_directory: Option<&Path>) -> Option<&Path> {
    destination_directory.filter(|dir| !dir.as_os_str().is_empty())
}

/// Renames `source` to `destination`, copying across filesystems.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_remove(source, destination, |path| fs::remove_file(path))
        }
        Err(e) => Err(e),
    }
}

/// Copies `source` to a new file at `destination`, then deletes `source`.
///
/// On any failure the partial copy is removed so the source stays the only
/// instance of the file.
fn copy_then_remove<F>(source: &Path, destination: &Path, remove_source: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let mut reader = File::open(source)?;
    let mut writer = File::create_new(destination)?;

    let copied = copy_contents(&mut reader, &mut writer, destination);
    drop(reader);
    drop(writer);

    if let Err(e) = copied.and_then(|_| remove_source(source)) {
        let _ = fs::remove_file(destination);
        return Err(e);
    }

    Ok(())
}

fn copy_contents(reader: &mut File, writer: &mut File, destination: &Path) -> io::Result<()> {
    io::copy(reader, writer)?;
    writer.sync_all()?;
    fs::set_permissions(destination, reader.metadata()?.permissions())
}
