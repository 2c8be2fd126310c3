//! OpenCV-backed camera session.

use super::{CameraSession, SensorMode, VideoFrame};
use crate::config::{AutofocusMode, ColourGains, ModeConfig};
use crate::error::{CameraError, Result};
use crate::imaging::white_balance;
use logging::Logger;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{
    CAP_ANY, CAP_PROP_AUTO_WB, CAP_PROP_AUTOFOCUS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH,
    VideoCapture,
};

/// Camera session over an OpenCV `VideoCapture`
///
/// The multiplexer sits in front of a single capture device, so one session
/// serves every slot.
pub struct OpenCvSession {
    capture: Option<VideoCapture>,
    device: i32,
    logger: Logger,
    mode: Option<SensorMode>,
    gains: Option<ColourGains>,
    frame_count: u64,
}

impl OpenCvSession {
    /// Opens the capture device
    ///
    /// # Arguments
    /// * `device` - Video device index
    /// * `logger` - Component logger
    ///
    /// # Returns
    /// * `Err(CameraError::HardwareInit)` - Device missing or held by another process
    pub fn open(device: i32, logger: Logger) -> Result<Self> {
        logger.info(&format!("Opening camera device {}", device));

        let capture = VideoCapture::new(device, CAP_ANY).map_err(|e| {
            CameraError::HardwareInit(format!("Failed to open camera {}: {}", device, e))
        })?;

        let opened = capture.is_opened().map_err(|e| {
            CameraError::HardwareInit(format!("Error verifying camera status: {}", e))
        })?;
        if !opened {
            return Err(CameraError::HardwareInit(format!(
                "Camera {} is not available (device busy or missing)",
                device
            )));
        }

        Ok(OpenCvSession {
            capture: Some(capture),
            device,
            logger,
            mode: None,
            gains: None,
            frame_count: 0,
        })
    }

    fn capture_mut(&mut self) -> Result<&mut VideoCapture> {
        self.capture.as_mut().ok_or(CameraError::SessionClosed)
    }

    /// Sets a property, logging when the backend ignores it
    fn set_property(&mut self, prop: i32, value: f64, name: &str) -> Result<()> {
        let accepted = self.capture_mut()?.set(prop, value).unwrap_or(false);
        if !accepted {
            self.logger
                .debug(&format!("Backend ignored {} = {}", name, value));
        }
        Ok(())
    }

    fn read_raw(&mut self) -> Result<Mat> {
        let mut mat = Mat::default();
        let ok = self
            .capture_mut()?
            .read(&mut mat)
            .map_err(|e| CameraError::Capture(format!("Failed to read frame: {}", e)))?;

        if !ok || mat.empty() {
            return Err(CameraError::Capture("Empty or invalid frame".to_string()));
        }
        Ok(mat)
    }

    fn actual_resolution(&mut self) -> Result<(u32, u32)> {
        let capture = self.capture_mut()?;
        let width = capture.get(CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(CAP_PROP_FRAME_HEIGHT)? as u32;
        Ok((width, height))
    }
}

impl CameraSession for OpenCvSession {
    fn apply_mode(&mut self, mode: SensorMode, config: &ModeConfig) -> Result<()> {
        self.set_property(CAP_PROP_FRAME_WIDTH, f64::from(config.width), "width")?;
        self.set_property(CAP_PROP_FRAME_HEIGHT, f64::from(config.height), "height")?;
        self.set_property(CAP_PROP_AUTOFOCUS, 1.0, "autofocus")?;

        if config.colour_gains.is_some() {
            self.set_property(CAP_PROP_AUTO_WB, 0.0, "auto white balance")?;
        } else {
            self.set_property(CAP_PROP_AUTO_WB, 1.0, "auto white balance")?;
        }

        // Stale frames from the previous mode; single-shot focus settles here.
        for _ in 0..config.warmup_frames {
            if let Err(e) = self.read_raw() {
                self.logger
                    .warn(&format!("Warm-up frame failed in {} mode: {}", mode, e));
            }
        }

        if config.autofocus == AutofocusMode::SingleShot {
            self.set_property(CAP_PROP_AUTOFOCUS, 0.0, "autofocus lock")?;
        }

        let (width, height) = self.actual_resolution()?;
        if (width, height) != config.resolution() {
            self.logger.warn(&format!(
                "Resolution mismatch in {} mode (got: {}x{}, requested: {}x{})",
                mode, width, height, config.width, config.height
            ));
        }

        self.gains = config.colour_gains;
        self.mode = Some(mode);
        self.logger.info(&format!(
            "Camera {} in {} mode at {}x{}",
            self.device, mode, width, height
        ));
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<VideoFrame> {
        let mut mat = self.read_raw()?;

        if let Some(gains) = self.gains {
            mat = white_balance::apply_gains(&mat, gains)
                .map_err(|e| CameraError::Capture(format!("Colour gains: {}", e)))?;
        }

        self.frame_count += 1;
        if self.frame_count.is_multiple_of(300) {
            let mode = self.mode.map_or_else(|| "unconfigured".to_string(), |m| m.to_string());
            self.logger.debug(&format!(
                "Frames captured: {} ({} mode)",
                self.frame_count, mode
            ));
        }

        VideoFrame::new(mat)
    }

    fn release(&mut self) -> Result<()> {
        if let Some(mut capture) = self.capture.take() {
            capture.release()?;
            self.mode = None;
            self.logger.info(&format!(
                "Camera {} released after {} frames",
                self.device, self.frame_count
            ));
        }
        Ok(())
    }
}

impl Drop for OpenCvSession {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
