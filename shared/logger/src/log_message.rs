//! Internal log record.

use crate::log_level::LogLevel;
use chrono::Local;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// One formatted-on-demand log record.
#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
}

impl LogMessage {
    /// Stamps a record with the current local time.
    pub fn new(level: LogLevel, component: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            level,
            component: component.to_string(),
            message,
        }
    }

    /// `timestamp - component - LEVEL - message\n`
    pub fn format(&self) -> String {
        format!(
            "{} - {} - {} - {}\n",
            self.timestamp,
            self.component,
            self.level.as_str(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_layout() {
        let msg = LogMessage::new(LogLevel::Info, "camera_manager", "Selected camera: 2".into());
        let formatted = msg.format();

        assert!(formatted.ends_with(" - camera_manager - INFO - Selected camera: 2\n"));
        assert!(formatted.starts_with(&msg.timestamp));
    }

    #[test]
    fn test_timestamp_has_millis() {
        let msg = LogMessage::new(LogLevel::Debug, "mux", String::new());
        // YYYY-MM-DD HH:MM:SS,mmm
        assert_eq!(msg.timestamp.len(), 23);
        assert_eq!(&msg.timestamp[19..20], ",");
    }
}
