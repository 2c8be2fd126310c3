//! Error types for camera manager operations.
//!
//! `HardwareInit`, `Select`, `Capture` and `Composition` are the failure
//! classes the request layer distinguishes; the rest are plumbing.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, CameraError>;

/// Error type for camera manager operations
#[derive(Debug)]
pub enum CameraError {
    /// Camera or I2C bus could not be opened (busy, missing, unreachable)
    HardwareInit(String),
    /// Multiplexer write failed; hardware state assumed unchanged
    Select(String),
    /// Sensor read or frame format failure
    Capture(String),
    /// Grid assembly, encoding or saving failed
    Composition(String),
    /// Invalid configuration value
    Config(String),
    /// Slot out of range or marked non-functional
    InvalidSlot(String),
    /// The hardware session has already been released
    SessionClosed,
    /// I/O error
    Io(io::Error),
    /// OpenCV error
    OpenCv(opencv::Error),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::HardwareInit(msg) => write!(f, "Hardware init error: {}", msg),
            CameraError::Select(msg) => write!(f, "Camera select error: {}", msg),
            CameraError::Capture(msg) => write!(f, "Capture error: {}", msg),
            CameraError::Composition(msg) => write!(f, "Composition error: {}", msg),
            CameraError::Config(msg) => write!(f, "Config error: {}", msg),
            CameraError::InvalidSlot(msg) => write!(f, "Invalid slot: {}", msg),
            CameraError::SessionClosed => write!(f, "Camera session already released"),
            CameraError::Io(err) => write!(f, "I/O error: {}", err),
            CameraError::OpenCv(err) => write!(f, "OpenCV error: {}", err),
        }
    }
}

impl std::error::Error for CameraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CameraError::Io(err) => Some(err),
            CameraError::OpenCv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CameraError {
    fn from(err: io::Error) -> Self {
        CameraError::Io(err)
    }
}

impl From<opencv::Error> for CameraError {
    fn from(err: opencv::Error) -> Self {
        CameraError::OpenCv(err)
    }
}

impl From<logging::LoggingError> for CameraError {
    fn from(err: logging::LoggingError) -> Self {
        CameraError::Config(format!("logging: {}", err))
    }
}

impl From<config_loader::ConfigError> for CameraError {
    fn from(err: config_loader::ConfigError) -> Self {
        CameraError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CameraError {
    fn from(err: serde_json::Error) -> Self {
        CameraError::Config(format!("invalid JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_taxonomy() {
        assert_eq!(
            CameraError::HardwareInit("Device or resource busy".into()).to_string(),
            "Hardware init error: Device or resource busy"
        );
        assert_eq!(
            CameraError::Select("bus 11 write failed".into()).to_string(),
            "Camera select error: bus 11 write failed"
        );
        assert_eq!(
            CameraError::Capture("empty frame".into()).to_string(),
            "Capture error: empty frame"
        );
        assert_eq!(
            CameraError::Composition("cell size mismatch".into()).to_string(),
            "Composition error: cell size mismatch"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "captures");
        let err: CameraError = io_err.into();

        assert!(matches!(err, CameraError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_session_closed_has_no_source() {
        let err = CameraError::SessionClosed;
        assert!(std::error::Error::source(&err).is_none());
    }
}
