//! Captured frame.

use crate::error::{CameraError, Result};
use opencv::core::{CV_8UC3, Mat};
use opencv::prelude::*;
use std::time::Instant;

/// One frame read from the sensor
///
/// Pixel data stays in OpenCV's native BGR order, 8 bits per channel.
#[derive(Clone)]
pub struct VideoFrame {
    data: Mat,
    timestamp: Instant,
}

impl VideoFrame {
    /// Wraps a matrix, stamping it with the current time
    ///
    /// # Returns
    /// * `Err(CameraError::Capture)` - Empty matrix or not 8-bit 3-channel
    pub fn new(mat: Mat) -> Result<Self> {
        if mat.empty() || mat.cols() == 0 || mat.rows() == 0 {
            return Err(CameraError::Capture("Empty or invalid frame".to_string()));
        }
        if mat.typ() != CV_8UC3 {
            return Err(CameraError::Capture(format!(
                "Unsupported frame format (type {}, expected 8-bit BGR)",
                mat.typ()
            )));
        }

        Ok(VideoFrame {
            data: mat,
            timestamp: Instant::now(),
        })
    }

    pub fn width(&self) -> i32 {
        self.data.cols()
    }

    pub fn height(&self) -> i32 {
        self.data.rows()
    }

    /// Monotonic capture time, for latency measurements
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn into_mat(self) -> Mat {
        self.data
    }
}
