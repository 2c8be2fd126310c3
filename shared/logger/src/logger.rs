//! Thread-safe asynchronous logger.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::log_writer::{WriterCommand, spawn_writer_thread};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Sender, channel};
use std::time::Duration;

/// Non-blocking logger.
///
/// Clones and component loggers share one channel to one writer thread.
///
/// # Examples
///
/// ```no_run
/// use logging::{Logger, LogLevel};
///
/// let logger = Logger::new("multicam.log".into(), LogLevel::Info, true).unwrap();
/// let mux = logger.for_component("mux");
/// mux.info("Selected camera: 0");
/// ```
#[derive(Clone)]
pub struct Logger {
    sender: Sender<WriterCommand>,
    level: LogLevel,
    component: Arc<str>,
    log_path: PathBuf,
}

impl Logger {
    /// Component name used until [`Logger::for_component`] is called.
    pub const ROOT_COMPONENT: &'static str = "multicam";

    /// Creates a logger and its writer thread.
    ///
    /// # Arguments
    ///
    /// * `log_path` - Path to log file (created if it doesn't exist)
    /// * `level` - Minimum level to record
    /// * `console` - Also echo every record to stdout
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be opened or the thread cannot start.
    pub fn new(log_path: PathBuf, level: LogLevel, console: bool) -> Result<Self> {
        let (sender, receiver) = channel();
        spawn_writer_thread(&log_path, console, receiver)?;
        Ok(Logger {
            sender,
            level,
            component: Arc::from(Self::ROOT_COMPONENT),
            log_path,
        })
    }

    /// Returns a logger tagged with another component name.
    ///
    /// Shares the writer thread of `self`; nothing is opened.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            sender: self.sender.clone(),
            level: self.level,
            component: Arc::from(component),
            log_path: self.log_path.clone(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level {
            return;
        }
        // The writer only disappears when the process is tearing down.
        let _ = self.sender.send(WriterCommand::Record(LogMessage::new(
            level,
            &self.component,
            message.to_string(),
        )));
    }

    /// Blocks until every record logged so far has been written.
    ///
    /// Call before `process::exit`, which does not wait for the writer
    /// thread. Returns `false` if the writer did not answer within `timeout`.
    pub fn flush(&self, timeout: Duration) -> bool {
        let (ack_tx, ack_rx) = channel();
        if self.sender.send(WriterCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv_timeout(timeout).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    fn wait_for_write() {
        thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn test_logger_respects_level() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Warn, false).unwrap();
        logger.debug("Debug message");
        logger.info("Info message");
        logger.warn("Warn message");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(!content.contains("Debug message"));
        assert!(!content.contains("Info message"));
        assert!(content.contains("Warn message"));
    }

    #[test]
    fn test_component_loggers_share_one_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let root = Logger::new(log_path.clone(), LogLevel::Debug, false).unwrap();
        let mux = root.for_component("mux");
        let cycle = root.for_component("cycle");

        root.info("starting");
        mux.debug("wrote 0x02");
        cycle.error("tick failed");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("multicam - INFO - starting"));
        assert!(content.contains("mux - DEBUG - wrote 0x02"));
        assert!(content.contains("cycle - ERROR - tick failed"));
        assert_eq!(mux.component(), "mux");
        assert_eq!(mux.log_path(), root.log_path());
    }

    #[test]
    fn test_logger_clone_across_threads() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Info, false).unwrap();
        let worker = logger.for_component("worker");

        thread::spawn(move || worker.info("Message from thread"))
            .join()
            .unwrap();
        logger.info("Message from main");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Message from thread"));
        assert!(content.contains("Message from main"));
    }

    #[test]
    fn test_flush_writes_pending_records() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Info, false).unwrap();
        let manager = logger.for_component("camera_manager");
        for i in 0..200 {
            manager.info(&format!("record {}", i));
        }

        assert!(logger.flush(Duration::from_secs(5)));
        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("record 0"));
        assert!(content.contains("record 199"));
    }
}
