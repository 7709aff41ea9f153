/// File categorization by extension.
///
/// This module maps file names to one of the fixed destination categories
/// (Documents, Applications, Photos, Videos, Archive, Torrents) using an
/// ordered extension table. Files whose extension matches no rule are
/// unclassified and are left where they are.
///
/// # Examples
///
/// ```
/// use autosort::file_category::{Category, CategoryRules};
///
/// let rules = CategoryRules::default();
/// assert_eq!(rules.classify("report.pdf"), Some(Category::Documents));
/// assert_eq!(rules.classify("movie.mkv"), Some(Category::Videos));
/// assert_eq!(rules.classify("notes.xyz"), None);
/// ```
use std::collections::HashSet;
use std::path::Path;

/// Label used for files that match no category rule.
pub const UNCLASSIFIED: &str = "";

/// Represents a destination category.
///
/// Each category owns one subdirectory of the base directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Text, office and design documents (PDF, DOCX, CSV, PSD, etc.)
    Documents,
    /// Installers, executables and scripts (EXE, MSI, SH, APK, etc.)
    Applications,
    /// Image files (JPG, PNG, SVG, etc.)
    Photos,
    /// Video files (MP4, MKV, AVI, etc.)
    Videos,
    /// Archive files (ZIP, RAR, 7Z, etc.)
    Archive,
    /// Torrent and NZB download descriptors
    Torrents,
}

impl Category {
    /// Every category, in rule evaluation order.
    pub const ALL: [Category; 6] = [
        Category::Documents,
        Category::Applications,
        Category::Photos,
        Category::Videos,
        Category::Archive,
        Category::Torrents,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use autosort::file_category::Category;
    ///
    /// assert_eq!(Category::Photos.dir_name(), "Photos");
    /// assert_eq!(Category::Archive.dir_name(), "Archive");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Documents => "Documents",
            Category::Applications => "Applications",
            Category::Photos => "Photos",
            Category::Videos => "Videos",
            Category::Archive => "Archive",
            Category::Torrents => "Torrents",
        }
    }

    /// Returns the directory names of all categories, in evaluation order.
    pub fn all_dir_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Category::dir_name).collect()
    }

    /// Extensions matched by the built-in rule for this category.
    fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Documents => &[
                ".txt", ".pdf", ".docx", ".xlsx", ".doc", ".ppt", ".odt", ".rtf", ".csv", ".xls",
                ".psd", ".ai", ".sketch",
            ],
            Category::Applications => &[".exe", ".msi", ".bat", ".sh", ".jar", ".apk", ".app"],
            Category::Photos => &[
                ".jpg", ".png", ".webp", ".gif", ".bmp", ".tiff", ".tif", ".svg",
            ],
            Category::Videos => &[
                ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".mpeg", ".mp4v",
            ],
            Category::Archive => &[".zip", ".rar", ".7z", ".tar", ".gz"],
            Category::Torrents => &[".torrent", ".nzb"],
        }
    }
}

/// Splits a file name into `(stem, extension)`.
///
/// The extension starts at the last `.` and includes it. Leading dots are part
/// of the stem, so `.bashrc` has no extension.
///
/// # Examples
///
/// ```
/// use autosort::file_category::split_extension;
///
/// assert_eq!(split_extension("photo.jpg"), ("photo", ".jpg"));
/// assert_eq!(split_extension("backup.tar.gz"), ("backup.tar", ".gz"));
/// assert_eq!(split_extension("README"), ("README", ""));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// ```
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let leading_dots = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[leading_dots..].rfind('.') {
        Some(idx) => file_name.split_at(leading_dots + idx),
        None => (file_name, ""),
    }
}

/// Ordered extension-to-category table.
///
/// Rules are evaluated in insertion order and the first rule containing the
/// extension wins. By default extensions are compared case-insensitively;
/// [`CategoryRules::with_match_case`] restores exact matching.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<(HashSet<String>, Category)>,
    match_case: bool,
}

impl CategoryRules {
    /// Creates the built-in rule table with case-insensitive matching.
    pub fn new() -> Self {
        Self::with_match_case(false)
    }

    /// Creates the built-in rule table, choosing how extension case is compared.
    pub fn with_match_case(match_case: bool) -> Self {
        let mut rules = Self {
            rules: Vec::new(),
            match_case,
        };
        for category in Category::ALL {
            for ext in category.default_extensions() {
                rules.add_extension_mapping(ext, category);
            }
        }
        rules
    }

    /// Returns true if extensions are compared exactly as written.
    pub fn match_case(&self) -> bool {
        self.match_case
    }

    /// Adds an extension to a category's rule.
    ///
    /// The leading dot is optional. A category seen for the first time is
    /// appended at the end of the evaluation order.
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) {
        let ext = self.normalize(&if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        });

        match self.rules.iter_mut().find(|(_, c)| *c == category) {
            Some((extensions, _)) => {
                extensions.insert(ext);
            }
            None => self.rules.push((HashSet::from([ext]), category)),
        }
    }

    /// Maps an extension (with its leading dot) to a category.
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        if ext.is_empty() {
            return None;
        }
        let ext = self.normalize(ext);
        self.rules
            .iter()
            .find(|(extensions, _)| extensions.contains(&ext))
            .map(|(_, category)| *category)
    }

    /// Determines the category of a file from its name.
    ///
    /// Returns `None` for unclassified files.
    pub fn classify(&self, file_name: &str) -> Option<Category> {
        let (_, ext) = split_extension(file_name);
        self.extension_to_category(ext)
    }

    /// Determines the category of the file at `path` from its final component.
    pub fn classify_path(&self, path: &Path) -> Option<Category> {
        let file_name = path.file_name()?.to_string_lossy();
        self.classify(&file_name)
    }

    /// Returns the category label for a file name, or [`UNCLASSIFIED`].
    ///
    /// # Examples
    ///
    /// ```
    /// use autosort::file_category::CategoryRules;
    ///
    /// let rules = CategoryRules::default();
    /// assert_eq!(rules.label("photo.png"), "Photos");
    /// assert_eq!(rules.label("notes.xyz"), "");
    /// ```
    pub fn label(&self, file_name: &str) -> &'static str {
        self.classify(file_name)
            .map(|category| category.dir_name())
            .unwrap_or(UNCLASSIFIED)
    }

    fn normalize(&self, ext: &str) -> String {
        if self.match_case {
            ext.to_string()
        } else {
            ext.to_lowercase()
        }
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Documents.dir_name(), "Documents");
        assert_eq!(Category::Applications.dir_name(), "Applications");
        assert_eq!(Category::Photos.dir_name(), "Photos");
        assert_eq!(Category::Videos.dir_name(), "Videos");
        assert_eq!(Category::Archive.dir_name(), "Archive");
        assert_eq!(Category::Torrents.dir_name(), "Torrents");
    }

    #[test]
    fn test_all_dir_names_in_order() {
        assert_eq!(
            Category::all_dir_names(),
            vec![
                "Documents",
                "Applications",
                "Photos",
                "Videos",
                "Archive",
                "Torrents"
            ]
        );
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.txt"), ("a", ".txt"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("..double.md"), ("..double", ".md"));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_classify_known_extensions() {
        let rules = CategoryRules::default();
        assert_eq!(rules.classify("report.pdf"), Some(Category::Documents));
        assert_eq!(rules.classify("setup.msi"), Some(Category::Applications));
        assert_eq!(rules.classify("photo.jpg"), Some(Category::Photos));
        assert_eq!(rules.classify("movie.mkv"), Some(Category::Videos));
        assert_eq!(rules.classify("backup.tar.gz"), Some(Category::Archive));
        assert_eq!(rules.classify("a.iso.torrent"), Some(Category::Torrents));
    }

    #[test]
    fn test_classify_every_builtin_extension() {
        let rules = CategoryRules::default();
        for category in Category::ALL {
            for ext in category.default_extensions() {
                let name = format!("file{}", ext);
                assert_eq!(rules.classify(&name), Some(category), "{}", name);
            }
        }
    }

    #[test]
    fn test_classify_unclassified() {
        let rules = CategoryRules::default();
        assert_eq!(rules.classify("notes.xyz"), None);
        assert_eq!(rules.classify("Makefile"), None);
        assert_eq!(rules.classify(".bashrc"), None);
        assert_eq!(rules.classify("trailing."), None);
        assert_eq!(rules.label("notes.xyz"), UNCLASSIFIED);
    }

    #[test]
    fn test_classify_case_insensitive_by_default() {
        let rules = CategoryRules::default();
        assert!(!rules.match_case());
        assert_eq!(rules.classify("photo.JPG"), Some(Category::Photos));
        assert_eq!(rules.classify("Report.Pdf"), Some(Category::Documents));
    }

    #[test]
    fn test_classify_match_case() {
        let rules = CategoryRules::with_match_case(true);
        assert_eq!(rules.classify("photo.jpg"), Some(Category::Photos));
        assert_eq!(rules.classify("photo.JPG"), None);
    }

    #[test]
    fn test_classify_path_uses_file_name() {
        let rules = CategoryRules::default();
        assert_eq!(
            rules.classify_path(Path::new("/base/dir.zip/clip.mp4")),
            Some(Category::Videos)
        );
        assert_eq!(rules.classify_path(Path::new("/")), None);
    }

    #[test]
    fn test_custom_mapping() {
        let mut rules = CategoryRules::default();
        rules.add_extension_mapping("epub", Category::Documents);
        rules.add_extension_mapping(".magnet", Category::Torrents);

        assert_eq!(rules.classify("book.epub"), Some(Category::Documents));
        assert_eq!(rules.classify("link.MAGNET"), Some(Category::Torrents));
    }

    #[test]
    fn test_first_rule_wins() {
        let mut rules = CategoryRules::default();
        // .zip already belongs to Archive; Documents is evaluated first.
        rules.add_extension_mapping(".zip", Category::Documents);
        assert_eq!(rules.classify("bundle.zip"), Some(Category::Documents));
    }
}
