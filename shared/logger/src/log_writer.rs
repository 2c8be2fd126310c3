//! Dedicated writer thread.
//!
//! The writer owns the file handle; loggers only hold the sending half of the
//! channel. The thread exits once every sender has been dropped.

use crate::error::{LoggingError, Result};
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

/// What loggers send to the writer thread
pub(crate) enum WriterCommand {
    Record(LogMessage),
    /// Answered once every record sent before it has been written
    Flush(Sender<()>),
}

pub(crate) struct LogWriter {
    file: File,
    console: bool,
}

impl LogWriter {
    /// Opens (or creates) the log file in append mode.
    pub fn new(log_path: &Path, console: bool) -> Result<Self> {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self { file, console })
    }

    fn write_message(&mut self, message: &LogMessage) {
        let line = message.format();

        if self.console {
            let mut stdout = io::stdout().lock();
            let _ = stdout.write_all(line.as_bytes());
        }

        if let Err(e) = self
            .file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
        {
            eprintln!("Error writing log: {}", e);
        }
    }

    fn run(mut self, receiver: Receiver<WriterCommand>) {
        for command in receiver {
            match command {
                WriterCommand::Record(message) => self.write_message(&message),
                WriterCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
    }
}

/// Opens the log file and starts the writer thread.
pub(crate) fn spawn_writer_thread(
    log_path: &Path,
    console: bool,
    receiver: Receiver<WriterCommand>,
) -> Result<()> {
    let writer = LogWriter::new(log_path, console)?;
    thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || writer.run(receiver))
        .map_err(|e| LoggingError::Writer(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_level::LogLevel;
    use std::fs;
    use std::sync::mpsc::channel;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_writer_creates_missing_parent() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("logs").join("multicam.log");

        assert!(LogWriter::new(&log_path, false).is_ok());
        assert!(log_path.exists());
    }

    #[test]
    fn test_writer_thread_drains_channel() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let (sender, receiver) = channel();

        spawn_writer_thread(&log_path, false, receiver).unwrap();
        sender
            .send(WriterCommand::Record(LogMessage::new(
                LogLevel::Warn,
                "storage",
                "disk nearly full".into(),
            )))
            .unwrap();
        drop(sender);

        thread::sleep(Duration::from_millis(100));

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("storage - WARNING - disk nearly full"));
    }

    #[test]
    fn test_flush_acknowledged_after_pending_records() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");
        let (sender, receiver) = channel();
        let (ack_tx, ack_rx) = channel();

        spawn_writer_thread(&log_path, false, receiver).unwrap();
        sender
            .send(WriterCommand::Record(LogMessage::new(
                LogLevel::Info,
                "camera_manager",
                "Releasing camera hardware".into(),
            )))
            .unwrap();
        sender.send(WriterCommand::Flush(ack_tx)).unwrap();

        ack_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Releasing camera hardware"));
    }
}
