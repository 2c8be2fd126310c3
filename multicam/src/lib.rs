//! # multicam
//!
//! Camera manager for a four-slot I2C camera multiplexer sharing a single
//! capture device.
//!
//! The [`CameraManager`] owns the camera session and the multiplexer channel.
//! It switches the sensor between a preview and a still configuration, cycles
//! through the functional slots in the background, captures every slot at
//! full resolution into a 2x2 grid composite and produces a lazy stream of
//! preview JPEGs.
//!
//! ```no_run
//! use multicam::{CameraManager, MulticamConfig, MuxTarget, Slot};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MulticamConfig::default();
//!     let logger = config.logging.open_logger()?;
//!     let manager = CameraManager::initialize(config, logger)?;
//!
//!     manager.select(MuxTarget::Slot(Slot(0)))?;
//!     let report = manager.capture_all_cameras()?;
//!     println!("grid: {}", report.grid_filename);
//!
//!     manager.cleanup()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod imaging;
pub mod manager;
pub mod mux;
pub mod session;
pub mod storage;

pub use config::{ColourGains, ModeConfig, MulticamConfig};
pub use error::{CameraError, Result};
pub use manager::{
    CameraManager, CaptureReport, CaptureResponse, ManagerStatus, PreviewFrames, SlotCapture,
    multipart_chunk,
};
pub use mux::{MuxChannel, MuxTarget, Slot};
pub use session::{CameraSession, SensorMode, VideoFrame};
