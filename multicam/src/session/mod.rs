//! Hardware camera session.
//!
//! One open capture device, always in exactly one of two sensor modes. The
//! manager owns the session and is the only caller of `apply_mode`.

pub mod frame;
pub mod opencv_session;

pub use frame::VideoFrame;
pub use opencv_session::OpenCvSession;

use crate::config::ModeConfig;
use crate::error::Result;
use serde::Serialize;
use std::fmt;

/// Active sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    /// Reduced resolution, continuous autofocus
    Preview,
    /// Full resolution, single-shot autofocus
    Still,
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorMode::Preview => write!(f, "preview"),
            SensorMode::Still => write!(f, "still"),
        }
    }
}

/// Open camera handle
///
/// Only one mode configuration may be applied at a time and switching is not
/// concurrent-safe; callers serialize access.
pub trait CameraSession: Send {
    /// Reconfigures the sensor
    ///
    /// # Arguments
    /// * `mode` - Mode being entered
    /// * `config` - Resolution, autofocus and colour settings for that mode
    fn apply_mode(&mut self, mode: SensorMode, config: &ModeConfig) -> Result<()>;

    /// Reads one frame from whatever the multiplexer currently routes
    ///
    /// # Returns
    /// * `Ok(VideoFrame)` - 8-bit, 3-channel BGR frame
    /// * `Err(CameraError::Capture)` - Empty or malformed frame
    /// * `Err(CameraError::SessionClosed)` - Session already released
    fn capture_frame(&mut self) -> Result<VideoFrame>;

    /// Releases the device. Safe to call more than once.
    fn release(&mut self) -> Result<()>;
}
