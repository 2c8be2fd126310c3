//! Captures directory.
//!
//! Files are named from a millisecond timestamp that never repeats within a
//! process. A batch lands on disk completely or not at all.

mod naming;
mod permissions;

pub use naming::{grid_filename, is_grid_filename, slot_filename};

use crate::error::{CameraError, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, Timelike};
use logging::Logger;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";
const PART_SUFFIX: &str = ".part";

/// Owner of the captures directory
pub struct CaptureStore {
    dir: PathBuf,
    file_mode: u32,
    last_stamp: Mutex<Option<NaiveDateTime>>,
    latest_grid: Mutex<Option<String>>,
    logger: Logger,
}

impl CaptureStore {
    /// Creates the directory if missing and fixes its permissions
    ///
    /// # Arguments
    /// * `dir` - Captures directory
    /// * `dir_mode` - Unix mode enforced on the directory
    /// * `file_mode` - Unix mode enforced on every saved file
    /// * `logger` - Component logger
    pub fn open<P: Into<PathBuf>>(dir: P, dir_mode: u32, file_mode: u32, logger: Logger) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        permissions::set_and_verify(&dir, dir_mode)?;

        let latest = scan_latest_grid(&dir);
        if let Some(name) = &latest {
            logger.info(&format!("Most recent capture on disk: {}", name));
        }
        logger.info(&format!("Captures directory {}", dir.display()));

        Ok(CaptureStore {
            dir,
            file_mode,
            last_stamp: Mutex::new(None),
            latest_grid: Mutex::new(latest),
            logger,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Returns a `YYYYMMDD_HHMMSS_mmm` stamp later than any returned before.
    pub fn next_stamp(&self) -> String {
        let now = Local::now().naive_local();
        let now = now
            .with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
            .unwrap_or(now);

        let mut last = self.last_stamp.lock().unwrap_or_else(|poisoned| {
            self.logger.error("Stamp mutex poisoned, recovering");
            poisoned.into_inner()
        });

        let stamp = match *last {
            Some(previous) if now <= previous => previous + ChronoDuration::milliseconds(1),
            _ => now,
        };
        *last = Some(stamp);

        stamp.format(STAMP_FORMAT).to_string()
    }

    /// Writes every file of a batch, or none of them
    ///
    /// Each file goes to `<name>.part`, gets its mode set and checked, then is
    /// renamed into place.
    ///
    /// # Returns
    /// * `Err(CameraError::Composition)` - Any write failed; the batch was rolled back
    pub fn write_batch(&self, files: &[(String, Vec<u8>)]) -> Result<()> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());

        for (name, bytes) in files {
            let target = self.path_of(name);
            let part = self.path_of(&format!("{}{}", name, PART_SUFFIX));

            if let Err(e) = self.write_one(&part, &target, bytes) {
                let _ = fs::remove_file(&part);
                for path in &written {
                    let _ = fs::remove_file(path);
                }
                self.logger.error(&format!(
                    "Saving {} failed, removed {} file(s) of the batch: {}",
                    name,
                    written.len(),
                    e
                ));
                return Err(CameraError::Composition(format!("Failed to save {}: {}", name, e)));
            }
            written.push(target);
        }

        self.logger
            .debug(&format!("Saved {} file(s) to {}", written.len(), self.dir.display()));
        Ok(())
    }

    fn write_one(&self, part: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = File::create(part)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        permissions::set_and_verify(part, self.file_mode)?;
        fs::rename(part, target)?;
        Ok(())
    }

    pub fn record_grid(&self, filename: &str) {
        let mut latest = self.latest_grid.lock().unwrap_or_else(|poisoned| {
            self.logger.error("Latest-capture mutex poisoned, recovering");
            poisoned.into_inner()
        });
        *latest = Some(filename.to_string());
    }

    /// Filename of the most recent grid composite, if any
    pub fn latest_grid(&self) -> Option<String> {
        self.latest_grid
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

fn scan_latest_grid(dir: &Path) -> Option<String> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_grid_filename(name))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::{LogLevel, Logger};
    use tempfile::{TempDir, tempdir};

    fn store() -> (TempDir, CaptureStore) {
        let dir = tempdir().unwrap();
        let logger = Logger::new(dir.path().join("test.log"), LogLevel::Debug, false).unwrap();
        let store = CaptureStore::open(dir.path().join("captures"), 0o755, 0o644, logger).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_directory() {
        let (_dir, store) = store();
        assert!(store.dir().is_dir());
        assert_eq!(store.latest_grid(), None);
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let (_dir, store) = store();
        let stamps: Vec<String> = (0..50).map(|_| store.next_stamp()).collect();

        for pair in stamps.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
        assert_eq!(stamps[0].len(), "20240101_120000_000".len());
    }

    #[test]
    fn test_write_batch() {
        let (_dir, store) = store();
        let files = vec![
            ("a.jpg".to_string(), vec![1, 2, 3]),
            ("b.jpg".to_string(), vec![4, 5]),
        ];

        store.write_batch(&files).unwrap();
        assert_eq!(fs::read(store.path_of("a.jpg")).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs::read(store.path_of("b.jpg")).unwrap(), vec![4, 5]);
        assert!(!store.path_of("a.jpg.part").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = store();
        store
            .write_batch(&[("c.jpg".to_string(), vec![0])])
            .unwrap();
        let mode = fs::metadata(store.path_of("c.jpg")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_failed_batch_leaves_nothing() {
        let (_dir, store) = store();
        // a directory in the way makes the second rename fail
        fs::create_dir(store.path_of("b.jpg")).unwrap();
        fs::write(store.path_of("b.jpg").join("keep"), b"x").unwrap();

        let files = vec![
            ("a.jpg".to_string(), vec![1]),
            ("b.jpg".to_string(), vec![2]),
        ];
        let result = store.write_batch(&files);

        assert!(matches!(result, Err(CameraError::Composition(_))));
        assert!(!store.path_of("a.jpg").exists());
        assert!(!store.path_of("b.jpg.part").exists());
    }

    #[test]
    fn test_latest_grid_scanned_on_open() {
        let dir = tempdir().unwrap();
        let captures = dir.path().join("captures");
        fs::create_dir_all(&captures).unwrap();
        fs::write(captures.join("capture_20240101_120000_000_grid.jpg"), b"").unwrap();
        fs::write(captures.join("capture_20240102_120000_000_grid.jpg"), b"").unwrap();
        fs::write(captures.join("capture_20240103_120000_000_cam0.jpg"), b"").unwrap();

        let logger = Logger::new(dir.path().join("test.log"), LogLevel::Info, false).unwrap();
        let store = CaptureStore::open(&captures, 0o755, 0o644, logger).unwrap();

        assert_eq!(
            store.latest_grid().as_deref(),
            Some("capture_20240102_120000_000_grid.jpg")
        );
        store.record_grid("capture_20240104_000000_000_grid.jpg");
        assert_eq!(
            store.latest_grid().as_deref(),
            Some("capture_20240104_000000_000_grid.jpg")
        );
    }
}
