/// Integration tests for autosort
///
/// These tests simulate real-world usage scenarios, testing the complete
/// end-to-end behavior of the watcher.
///
/// Test categories:
/// 1. Bootstrapping category directories
/// 2. Sequential event handling through the watch loop
/// 3. Collision handling
/// 4. Watch rules (case matching and filters)
/// 5. Base directory selection
/// 6. The real filesystem backend
use autosort::config::{BaseDirectoryConfig, WatchRules};
use autosort::file_category::{Category, CategoryRules};
use autosort::monitor::{
    EVENT_CHANNEL_CAPACITY, FileEvent, Monitor, MonitorState, RunSummary, WatchMessage, subscribe,
};
use autosort::picker::{Preselected, select_base_directory};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary base directory plus helpers to drive a monitor over it.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file with content in the base directory.
    fn create_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let file_path = self.path().join(name);
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
        file_path
    }

    fn monitor(&self) -> Monitor {
        self.monitor_with_rules(&WatchRules::default())
    }

    fn monitor_with_rules(&self, rules: &WatchRules) -> Monitor {
        Monitor::new(
            BaseDirectoryConfig::new(self.path()),
            CategoryRules::with_match_case(rules.match_case),
            rules.compile_filters().expect("Failed to compile filters"),
        )
    }

    /// Feed creation events for `names` (in order) into a monitor, then stop it.
    fn run_events(&self, monitor: &mut Monitor, names: &[&str]) -> RunSummary {
        let (tx, rx) = mpsc::sync_channel(EVENT_CHANNEL_CAPACITY);
        for name in names {
            tx.send(WatchMessage::Created(FileEvent::file(self.path().join(name))))
                .expect("Failed to queue event");
        }
        tx.send(WatchMessage::Interrupt)
            .expect("Failed to queue interrupt");
        monitor.run(rx)
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn read(&self, rel_path: &str) -> Vec<u8> {
        fs::read(self.path().join(rel_path)).expect("Failed to read file")
    }
}

// ============================================================================
// 1. Bootstrapping
// ============================================================================

#[test]
fn test_bootstrap_creates_all_categories() {
    let fixture = TestFixture::new();
    let report = fixture.monitor().bootstrap().expect("Bootstrap failed");

    assert_eq!(report.created.len(), Category::ALL.len());
    for name in Category::all_dir_names() {
        fixture.assert_dir_exists(name);
    }
}

#[test]
fn test_bootstrap_is_idempotent() {
    let fixture = TestFixture::new();
    let monitor = fixture.monitor();
    monitor.bootstrap().expect("First bootstrap failed");

    let report = monitor.bootstrap().expect("Second bootstrap failed");

    assert!(report.created.is_empty());
    assert_eq!(report.existing.len(), Category::ALL.len());
}

#[test]
fn test_bootstrap_partial_failure() {
    let fixture = TestFixture::new();
    fixture.create_file("Archive", b"a file squatting on the category name");

    let report = fixture.monitor().bootstrap().expect("Bootstrap failed");

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.created.len(), Category::ALL.len() - 1);
    fixture.assert_dir_exists("Torrents");
}

#[test]
fn test_bootstrap_missing_base_directory() {
    let fixture = TestFixture::new();
    let monitor = Monitor::new(
        BaseDirectoryConfig::new(fixture.path().join("missing")),
        CategoryRules::default(),
        WatchRules::default().compile_filters().unwrap(),
    );

    assert!(monitor.bootstrap().is_err());
}

// ============================================================================
// 2. Sequential event handling
// ============================================================================

#[test]
fn test_every_category_is_sorted() {
    let fixture = TestFixture::new();
    let names = [
        "report.pdf",
        "installer.msi",
        "holiday.png",
        "clip.mp4",
        "backup.7z",
        "distro.torrent",
    ];
    for name in names {
        fixture.create_file(name, name.as_bytes());
    }

    let mut monitor = fixture.monitor();
    monitor.bootstrap().unwrap();
    let summary = fixture.run_events(&mut monitor, &names);

    assert_eq!(summary.moved, names.len());
    fixture.assert_file_exists("Documents/report.pdf");
    fixture.assert_file_exists("Applications/installer.msi");
    fixture.assert_file_exists("Photos/holiday.png");
    fixture.assert_file_exists("Videos/clip.mp4");
    fixture.assert_file_exists("Archive/backup.7z");
    fixture.assert_file_exists("Torrents/distro.torrent");
    for name in names {
        fixture.assert_file_not_exists(name);
    }
}

#[test]
fn test_moved_content_is_identical() {
    let fixture = TestFixture::new();
    let content: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
    fixture.create_file("dataset.csv", &content);

    let mut monitor = fixture.monitor();
    fixture.run_events(&mut monitor, &["dataset.csv"]);

    assert_eq!(fixture.read("Documents/dataset.csv"), content);
    fixture.assert_file_not_exists("dataset.csv");
}

#[test]
fn test_unclassified_file_stays_in_place() {
    let fixture = TestFixture::new();
    fixture.create_file("notes.xyz", b"unknown");

    let mut monitor = fixture.monitor();
    monitor.bootstrap().unwrap();
    let summary = fixture.run_events(&mut monitor, &["notes.xyz"]);

    assert_eq!(summary.unclassified, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(fixture.read("notes.xyz"), b"unknown");
}

#[test]
fn test_failed_move_does_not_stop_the_loop() {
    let fixture = TestFixture::new();
    fixture.create_file("after.gif", b"gif");

    let mut monitor = fixture.monitor();
    let summary = fixture.run_events(&mut monitor, &["never-existed.pdf", "after.gif"]);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.moved, 1);
    assert_eq!(monitor.state(), MonitorState::Stopped);
    fixture.assert_file_exists("Photos/after.gif");
}

#[test]
fn test_dry_run_moves_nothing() {
    let fixture = TestFixture::new();
    fixture.create_file("song.zip", b"zip");

    let mut monitor = fixture.monitor().with_dry_run(true);
    monitor.bootstrap().unwrap();
    let summary = fixture.run_events(&mut monitor, &["song.zip"]);

    assert_eq!(summary.planned, 1);
    assert_eq!(summary.moved, 0);
    fixture.assert_file_exists("song.zip");
    fixture.assert_file_not_exists("Archive");
}

// ============================================================================
// 3. Collisions
// ============================================================================

#[test]
fn test_same_name_twice_end_to_end() {
    let fixture = TestFixture::new();
    let mut monitor = fixture.monitor();
    monitor.bootstrap().unwrap();

    fixture.create_file("photo.jpg", b"first");
    fixture.run_events(&mut monitor, &["photo.jpg"]);
    fixture.assert_file_exists("Photos/photo.jpg");

    fixture.create_file("photo.jpg", b"second");
    fixture.run_events(&mut monitor, &["photo.jpg"]);

    assert_eq!(fixture.read("Photos/photo.jpg"), b"first");
    assert_eq!(fixture.read("Photos/photo (1).jpg"), b"second");
}

#[test]
fn test_quick_succession_gets_distinct_names() {
    let fixture = TestFixture::new();
    let mut monitor = fixture.monitor();

    // Each file is handled before the next one with the same name arrives.
    for round in 0..3 {
        fixture.create_file("a.txt", format!("round {}", round).as_bytes());
        fixture.run_events(&mut monitor, &["a.txt"]);
    }

    assert_eq!(fixture.read("Documents/a.txt"), b"round 0");
    assert_eq!(fixture.read("Documents/a (1).txt"), b"round 1");
    assert_eq!(fixture.read("Documents/a (2).txt"), b"round 2");
}

// ============================================================================
// 4. Watch rules
// ============================================================================

#[test]
fn test_uppercase_extension_default_and_match_case() {
    let fixture = TestFixture::new();
    fixture.create_file("IMG_0001.JPG", b"jpeg");
    fixture.create_file("SCAN.PDF", b"pdf");

    let strict = WatchRules::parse("match_case = true").unwrap();
    let mut strict_monitor = fixture.monitor_with_rules(&strict);
    let summary = fixture.run_events(&mut strict_monitor, &["SCAN.PDF"]);
    assert_eq!(summary.unclassified, 1);
    fixture.assert_file_exists("SCAN.PDF");

    let mut monitor = fixture.monitor();
    fixture.run_events(&mut monitor, &["IMG_0001.JPG", "SCAN.PDF"]);
    fixture.assert_file_exists("Photos/IMG_0001.JPG");
    fixture.assert_file_exists("Documents/SCAN.PDF");
}

#[test]
fn test_filters_leave_partial_downloads() {
    let fixture = TestFixture::new();
    fixture.create_file("movie.mkv.crdownload", b"partial");
    fixture.create_file("movie.mkv.part", b"partial");
    fixture.create_file(".cache.zip", b"hidden");
    fixture.create_file("movie.mkv", b"complete");

    let rules = WatchRules::parse(
        r#"
        [filters]
        enable_hidden_files = false

        [filters.exclude]
        extensions = ["crdownload"]
        patterns = ["*.part"]
        "#,
    )
    .unwrap();
    let mut monitor = fixture.monitor_with_rules(&rules);
    let summary = fixture.run_events(
        &mut monitor,
        &[
            "movie.mkv.crdownload",
            "movie.mkv.part",
            ".cache.zip",
            "movie.mkv",
        ],
    );

    assert_eq!(summary.filtered, 3);
    assert_eq!(summary.moved, 1);
    fixture.assert_file_exists("movie.mkv.crdownload");
    fixture.assert_file_exists("movie.mkv.part");
    fixture.assert_file_exists(".cache.zip");
    fixture.assert_file_exists("Videos/movie.mkv");
}

#[test]
fn test_hidden_file_sorted_without_rules() {
    let fixture = TestFixture::new();
    fixture.create_file(".report.pdf", b"pdf");

    let mut monitor = fixture.monitor();
    let summary = fixture.run_events(&mut monitor, &[".report.pdf"]);

    assert_eq!(summary.moved, 1);
    assert_eq!(summary.filtered, 0);
    assert_eq!(fixture.read("Documents/.report.pdf"), b"pdf");
    fixture.assert_file_not_exists(".report.pdf");
}

#[test]
fn test_rules_loaded_from_file() {
    let fixture = TestFixture::new();
    let rules_path = fixture.create_file(
        "rules.toml",
        b"match_case = true\n[filters]\nenable_hidden_files = true\n",
    );

    let rules = WatchRules::load(Some(&rules_path)).expect("Failed to load rules");

    assert!(rules.match_case);
    assert!(rules.filters.enable_hidden_files);
}

// ============================================================================
// 5. Base directory selection
// ============================================================================

#[test]
fn test_select_then_watch_uses_saved_directory() {
    let fixture = TestFixture::new();
    let inbox = fixture.path().join("inbox");
    fs::create_dir(&inbox).unwrap();
    let path_file = fixture.path().join("base_directory.txt");

    select_base_directory(&mut Preselected(inbox.clone()), &path_file).expect("Select failed");
    let config = BaseDirectoryConfig::load(&path_file).expect("Load failed");

    fs::write(inbox.join("paper.docx"), b"docx").unwrap();
    let mut monitor = Monitor::new(
        config,
        CategoryRules::default(),
        WatchRules::default().compile_filters().unwrap(),
    );
    let (tx, rx) = mpsc::sync_channel(EVENT_CHANNEL_CAPACITY);
    tx.send(WatchMessage::Created(FileEvent::file(inbox.join("paper.docx"))))
        .unwrap();
    drop(tx);
    monitor.run(rx);

    assert!(inbox.join("Documents").join("paper.docx").is_file());
}

// ============================================================================
// 6. Real filesystem backend
// ============================================================================

fn wait_for(path: &Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.is_file() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    false
}

#[test]
fn test_real_watcher_sorts_new_file() {
    let fixture = TestFixture::new();
    let base = fixture.path().to_path_buf();
    let mut monitor = fixture.monitor();
    monitor.bootstrap().unwrap();

    let (tx, rx) = mpsc::sync_channel(EVENT_CHANNEL_CAPACITY);
    let watcher = subscribe(&base, tx.clone()).expect("Failed to subscribe");
    let handle = thread::spawn(move || monitor.run(rx));

    fs::write(base.join("photo.jpg"), b"jpeg bytes").unwrap();
    let sorted = base.join("Photos").join("photo.jpg");
    let arrived = wait_for(&sorted, Duration::from_secs(10));

    tx.send(WatchMessage::Interrupt).unwrap();
    let summary = handle.join().expect("Monitor thread panicked");
    drop(watcher);

    assert!(arrived, "photo.jpg was not relocated");
    assert!(summary.moved >= 1);
    assert!(!base.join("photo.jpg").exists());
}
