//! Polling file watcher.
//!
//! Walks the served directory on a fixed interval and broadcasts a reload
//! frame whenever the newest modification time among watched files
//! advances. Polling keeps the behavior identical across platforms and
//! makes change detection testable with plain timestamps; at dev-server
//! scale the scan cost is negligible.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::frame;
use super::registry::ClientRegistry;

/// Configuration for the polling watcher.
#[derive(Clone, Debug)]
pub(crate) struct WatcherConfig {
    /// Root directory scanned recursively.
    pub root_dir: PathBuf,
    /// File suffixes that participate in the scan.
    pub extensions: Vec<String>,
    /// Delay between scans.
    pub poll_interval: Duration,
}

/// Most recent modification time among watched files under `root`.
///
/// Best-effort: unreadable directories, vanished files and metadata errors
/// are skipped silently. `None` when no watched file is found.
pub(crate) fn scan_latest_mtime(root: &Path, extensions: &[String]) -> Option<SystemTime> {
    let mut latest = None;
    scan_dir(root, extensions, &mut latest);
    latest
}

fn scan_dir(dir: &Path, extensions: &[String], latest: &mut Option<SystemTime>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_dir(&path, extensions, latest);
        } else if is_watched(&path, extensions) {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                if latest.is_none_or(|current| modified > current) {
                    *latest = Some(modified);
                }
            }
        }
    }
}

/// Check whether a file name ends in one of the watched suffixes.
fn is_watched(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();

    extensions.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// Tracks the newest stamp seen across scans and reports advancement.
///
/// The stamp is expected to be non-decreasing; a decrease (clock skew, a
/// file replaced by an older copy) is treated as no change rather than an
/// error, and the high-water mark is kept.
#[derive(Debug)]
pub(crate) struct ChangeDetector {
    last_stamp: Option<SystemTime>,
}

impl ChangeDetector {
    /// Seed the detector with the result of an initial scan.
    pub(crate) fn new(initial: Option<SystemTime>) -> Self {
        Self {
            last_stamp: initial,
        }
    }

    /// Feed one scan result; true when the stamp advanced.
    pub(crate) fn observe(&mut self, current: Option<SystemTime>) -> bool {
        match (self.last_stamp, current) {
            (Some(last), Some(stamp)) if stamp > last => {
                self.last_stamp = Some(stamp);
                true
            }
            // The first watched file appeared after startup
            (None, Some(stamp)) => {
                self.last_stamp = Some(stamp);
                true
            }
            _ => false,
        }
    }
}

/// Background task that drives reload broadcasts from filesystem polling.
pub(crate) struct FileWatcher {
    config: WatcherConfig,
    registry: Arc<ClientRegistry>,
}

impl FileWatcher {
    /// Create a watcher over `registry`'s clients.
    pub(crate) fn new(config: WatcherConfig, registry: Arc<ClientRegistry>) -> Self {
        Self { config, registry }
    }

    /// Spawn the watch loop; it runs for the life of the process.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(self) {
        let Self { config, registry } = self;
        let reload = frame::reload_frame();

        let mut detector =
            ChangeDetector::new(scan_latest_mtime(&config.root_dir, &config.extensions));
        let mut interval = tokio::time::interval(config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            root = %config.root_dir.display(),
            interval = ?config.poll_interval,
            "Watching for file changes"
        );

        loop {
            interval.tick().await;

            let stamp = scan_latest_mtime(&config.root_dir, &config.extensions);
            if detector.observe(stamp) {
                let clients = registry.broadcast(&reload);
                tracing::info!(clients, "File change detected, reload sent");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    fn extensions() -> Vec<String> {
        [".html", ".css", ".js"].map(String::from).to_vec()
    }

    #[test]
    fn test_detector_fires_only_on_advancement() {
        // First scan seeds the detector; broadcasts fire at 10->15 and
        // 15->20 only. The decrease to 12 is tolerated and ignored.
        let mut detector = ChangeDetector::new(stamp(10));

        let fired: Vec<bool> = [10, 15, 15, 12, 20]
            .into_iter()
            .map(|s| detector.observe(stamp(s)))
            .collect();

        assert_eq!(fired, [false, true, false, false, true]);
    }

    #[test]
    fn test_detector_equal_stamp_is_no_change() {
        let mut detector = ChangeDetector::new(stamp(10));

        assert!(!detector.observe(stamp(10)));
    }

    #[test]
    fn test_detector_decrease_keeps_high_water_mark() {
        let mut detector = ChangeDetector::new(stamp(20));

        assert!(!detector.observe(stamp(12)));
        // 15 is still below the high-water mark
        assert!(!detector.observe(stamp(15)));
        assert!(detector.observe(stamp(25)));
    }

    #[test]
    fn test_detector_first_file_appearing_fires() {
        let mut detector = ChangeDetector::new(None);

        assert!(detector.observe(stamp(10)));
        assert!(!detector.observe(stamp(10)));
    }

    #[test]
    fn test_detector_empty_scan_is_no_change() {
        let mut detector = ChangeDetector::new(stamp(10));

        assert!(!detector.observe(None));
        assert!(detector.observe(stamp(11)));
    }

    #[test]
    fn test_is_watched_suffixes() {
        let exts = extensions();

        assert!(is_watched(Path::new("/site/index.html"), &exts));
        assert!(is_watched(Path::new("/site/app.js"), &exts));
        assert!(is_watched(Path::new("/site/style.css"), &exts));
        assert!(!is_watched(Path::new("/site/readme.txt"), &exts));
        assert!(!is_watched(Path::new("/site/html"), &exts));
    }

    #[test]
    fn test_scan_finds_watched_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();

        assert!(scan_latest_mtime(dir.path(), &extensions()).is_some());
    }

    #[test]
    fn test_scan_recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("assets").join("js");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("app.js"), "console.log(1)").unwrap();

        assert!(scan_latest_mtime(dir.path(), &extensions()).is_some());
    }

    #[test]
    fn test_scan_ignores_unwatched_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "notes").unwrap();

        assert_eq!(scan_latest_mtime(dir.path(), &extensions()), None);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(scan_latest_mtime(dir.path(), &extensions()), None);
    }

    #[test]
    fn test_scan_missing_directory_is_none() {
        assert_eq!(
            scan_latest_mtime(Path::new("/nonexistent"), &extensions()),
            None
        );
    }

    #[test]
    fn test_scan_tracks_maximum_mtime() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "a").unwrap();
        fs::write(dir.path().join("b.css"), "b").unwrap();

        let latest = scan_latest_mtime(dir.path(), &extensions()).unwrap();
        let a = fs::metadata(dir.path().join("a.html")).unwrap().modified().unwrap();
        let b = fs::metadata(dir.path().join("b.css")).unwrap().modified().unwrap();

        assert_eq!(latest, a.max(b));
    }
}
