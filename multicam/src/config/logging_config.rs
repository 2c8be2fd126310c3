use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file_path: String,
    pub log_level: String,
    pub enable_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_file_path: "multicam.log".to_string(),
            log_level: "info".to_string(),
            enable_console: true,
        }
    }
}

impl LoggingConfig {
    /// Opens the root logger described by this section.
    pub fn open_logger(&self) -> logging::Result<logging::Logger> {
        let level = self.log_level.parse()?;
        logging::Logger::new(self.log_file_path.clone().into(), level, self.enable_console)
    }
}
