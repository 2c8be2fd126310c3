//! Preview frame production.

use super::Shared;
use crate::error::Result;
use crate::imaging::{draw_crosshair, draw_label, encode_jpeg};
use crate::mux::MuxTarget;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const MULTIPART_HEADER: &[u8] = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";

/// Wraps one JPEG frame in the `multipart/x-mixed-replace` part framing
pub fn multipart_chunk(frame: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(MULTIPART_HEADER.len() + frame.len() + 2);
    chunk.extend_from_slice(MULTIPART_HEADER);
    chunk.extend_from_slice(frame);
    chunk.extend_from_slice(b"\r\n");
    chunk
}

/// Endless iterator of annotated preview JPEGs
///
/// Capture errors and stalls are logged and retried after a backoff. The
/// iterator only ends once the manager has released the hardware.
pub struct PreviewFrames {
    shared: Arc<Shared>,
    last_frame: Option<Instant>,
    frames: u64,
}

enum Tick {
    Frame(Vec<u8>),
    Stalled(Duration),
    Closed,
}

impl PreviewFrames {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        PreviewFrames {
            shared,
            last_frame: None,
            frames: 0,
        }
    }

    /// Frames produced so far
    pub fn produced(&self) -> u64 {
        self.frames
    }

    fn pace(&self) {
        let interval = self.shared.config.timing.preview_frame_interval();
        if let Some(last) = self.last_frame {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
    }

    fn tick(&self) -> Result<Tick> {
        let shared = &self.shared;

        let (frame, elapsed, target) = {
            let mut hardware = shared.lock_hardware();
            let Some(hw) = hardware.as_mut() else {
                return Ok(Tick::Closed);
            };
            let started = Instant::now();
            let frame = hw.session.capture_frame()?;
            let elapsed = frame.timestamp().saturating_duration_since(started);
            (frame, elapsed, shared.current_target())
        };

        if elapsed > shared.config.timing.freeze_threshold() {
            return Ok(Tick::Stalled(elapsed));
        }

        let mut mat = frame.into_mat();
        if let Some(slot) = target.and_then(MuxTarget::slot) {
            draw_label(&mut mat, &slot.label())?;
        }
        draw_crosshair(&mut mat)?;

        let jpeg = encode_jpeg(&mat, shared.config.composition.jpeg_quality)?;
        Ok(Tick::Frame(jpeg))
    }
}

impl Iterator for PreviewFrames {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let shared = Arc::clone(&self.shared);
        let logger = &shared.log.preview;
        let backoff = shared.config.timing.preview_error_backoff();

        loop {
            if shared.is_closed() {
                return None;
            }
            self.pace();

            match self.tick() {
                Ok(Tick::Frame(jpeg)) => {
                    self.last_frame = Some(Instant::now());
                    self.frames += 1;
                    return Some(jpeg);
                }
                Ok(Tick::Closed) => return None,
                Ok(Tick::Stalled(elapsed)) => {
                    logger.error(&format!(
                        "Preview capture stalled for {} ms, dropping frame",
                        elapsed.as_millis()
                    ));
                    thread::sleep(backoff);
                }
                Err(e) => {
                    logger.error(&format!("Preview frame failed: {}", e));
                    thread::sleep(backoff);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_chunk() {
        let chunk = multipart_chunk(&[0xFF, 0xD8, 0xFF, 0xD9]);
        let mut expected = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9]);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(chunk, expected);
    }
}
