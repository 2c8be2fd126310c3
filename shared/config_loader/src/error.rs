use std::fmt;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while locating or reading a configuration file
#[derive(Debug)]
pub enum ConfigError {
    /// No file at the given path, or in any searched location
    FileNotFound(String),

    /// The file exists but could not be read
    ReadError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::ReadError(msg) => {
                write!(f, "Failed to read configuration file: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
