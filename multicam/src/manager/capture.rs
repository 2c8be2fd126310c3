//! High-resolution capture and grid composition.

use super::{CameraManager, CaptureReport, Hardware, Shared, SlotCapture};
use crate::error::{CameraError, Result};
use crate::imaging::{center_crop, compose_grid, draw_crosshair, encode_jpeg, placeholder_tile};
use crate::mux::{MuxTarget, Slot};
use crate::session::SensorMode;
use crate::storage::{grid_filename, slot_filename};
use opencv::core::Mat;
use std::thread;

/// Holds the session in still mode; dropping it switches back to preview
struct StillModeGuard<'a> {
    shared: &'a Shared,
    hardware: &'a mut Hardware,
}

impl<'a> StillModeGuard<'a> {
    fn enter(shared: &'a Shared, hardware: &'a mut Hardware) -> Result<Self> {
        let mut guard = StillModeGuard { shared, hardware };
        // On failure the guard is dropped here and preview is re-applied.
        guard
            .shared
            .apply_mode_locked(&mut *guard.hardware, SensorMode::Still)?;
        thread::sleep(guard.shared.config.timing.stabilization_delay());
        Ok(guard)
    }

    fn hardware(&mut self) -> &mut Hardware {
        &mut *self.hardware
    }
}

impl Drop for StillModeGuard<'_> {
    fn drop(&mut self) {
        let logger = &self.shared.log.capture;
        match self
            .shared
            .apply_mode_locked(&mut *self.hardware, SensorMode::Preview)
        {
            Ok(()) => logger.debug("Preview configuration restored"),
            Err(e) => logger.error(&format!("Failed to restore preview configuration: {}", e)),
        }
    }
}

/// One slot's outcome before composition
struct RawCapture {
    slot: Slot,
    frame: std::result::Result<Mat, String>,
}

impl Shared {
    /// Runs `body` with the session in still mode. Caller holds the hardware lock.
    ///
    /// Preview is restored on every exit path, then the selection that was
    /// active before the call.
    fn still_section<T>(
        &self,
        hardware: &mut Hardware,
        body: impl FnOnce(&Shared, &mut Hardware) -> T,
    ) -> Result<T> {
        let previous = self.current_target();

        let output = {
            let mut guard = StillModeGuard::enter(self, hardware)?;
            body(self, guard.hardware())
        };

        if let Some(target) = previous
            && self.current_target() != Some(target)
            && let Err(e) = self.select_locked(hardware, target)
        {
            self.log
                .capture
                .warn(&format!("Could not restore selection {}: {}", target, e));
        }

        Ok(output)
    }

    /// Selects `slot`, waits for it to settle and reads one frame
    fn capture_slot_locked(&self, hardware: &mut Hardware, slot: Slot) -> Result<Mat> {
        self.select_locked(hardware, MuxTarget::Slot(slot))?;
        thread::sleep(self.config.timing.slot_settle_delay());

        let frame = hardware.session.capture_frame()?;
        self.log.capture.info(&format!(
            "Captured slot {} at {}x{}",
            slot,
            frame.width(),
            frame.height()
        ));
        Ok(frame.into_mat())
    }

    fn capture_batch_locked(&self, hardware: &mut Hardware) -> Result<Vec<RawCapture>> {
        let hw_config = &self.config.hardware;

        self.still_section(hardware, |shared, hardware| {
            (0..hw_config.camera_count)
                .map(Slot)
                .map(|slot| {
                    if !hw_config.is_functional(slot.0) {
                        shared
                            .log
                            .capture
                            .debug(&format!("Slot {} is non-functional, using placeholder", slot));
                        return RawCapture {
                            slot,
                            frame: Err("marked non-functional".to_string()),
                        };
                    }

                    let frame = shared.capture_slot_locked(hardware, slot).map_err(|e| {
                        shared
                            .log
                            .capture
                            .error(&format!("Capture from slot {} failed: {}", slot, e));
                        e.to_string()
                    });
                    RawCapture { slot, frame }
                })
                .collect()
        })
    }

    /// Crops, annotates, encodes and saves a batch
    fn finish_batch(&self, raw: Vec<RawCapture>) -> Result<CaptureReport> {
        let comp = &self.config.composition;
        let (cell_w, cell_h) = (comp.cell_width as i32, comp.cell_height as i32);
        let stamp = self.store.next_stamp();

        let mut cells = Vec::with_capacity(raw.len());
        let mut files = Vec::with_capacity(raw.len() + 1);
        let mut slots = Vec::with_capacity(raw.len());

        for capture in raw {
            match capture.frame {
                Ok(mut full) => {
                    let mut cell = center_crop(&full, cell_w, cell_h)?;
                    draw_crosshair(&mut cell)?;

                    draw_crosshair(&mut full)?;
                    let name = slot_filename(&stamp, capture.slot);
                    files.push((name.clone(), encode_jpeg(&full, comp.jpeg_quality)?));

                    cells.push(cell);
                    slots.push(SlotCapture::captured(capture.slot, name));
                }
                Err(reason) => {
                    let mut cell = placeholder_tile(cell_w, cell_h, &capture.slot.label())?;
                    draw_crosshair(&mut cell)?;

                    cells.push(cell);
                    slots.push(SlotCapture::failed(capture.slot, reason));
                }
            }
        }

        let grid = compose_grid(cells, cell_w, cell_h)?;
        let grid_name = grid_filename(&stamp);
        files.push((grid_name.clone(), encode_jpeg(&grid, comp.jpeg_quality)?));
        drop(grid);

        self.store.write_batch(&files)?;
        self.store.record_grid(&grid_name);

        Ok(CaptureReport::new(stamp, slots, grid_name))
    }
}

impl CameraManager {
    /// Runs `body` in still mode with cycling paused
    ///
    /// Takes the operation lock and then the hardware lock once for the whole
    /// section. Cycling resumes afterwards if it was running.
    fn with_still_mode<T>(&self, body: impl FnOnce(&Shared, &mut Hardware) -> Result<T>) -> Result<T> {
        let mut operation = self.lock_operation();
        let resume = self.stop_cycle_locked(&mut operation);

        let outcome = {
            let mut hardware = self.shared.lock_hardware();
            match hardware.as_mut() {
                Some(hw) => self.shared.still_section(hw, body).and_then(|inner| inner),
                None => Err(CameraError::SessionClosed),
            }
        };

        if let Some(interval) = resume {
            self.shared.log.capture.info("Restoring cycling after capture");
            if let Err(e) = self.start_cycle_locked(&mut operation, interval) {
                self.shared
                    .log
                    .capture
                    .error(&format!("Could not restart cycling: {}", e));
            }
        }

        outcome
    }

    /// Captures every slot at full resolution and saves them with a 2x2 grid
    ///
    /// A failed or non-functional slot becomes a placeholder cell and never
    /// aborts the batch. The session is in still mode exactly once per call.
    ///
    /// # Returns
    /// * `Ok(CaptureReport)` - Per-slot results, saved filenames, grid filename
    /// * `Err(CameraError::Composition)` - Assembly or saving failed; nothing was left on disk
    pub fn capture_all_cameras(&self) -> Result<CaptureReport> {
        let logger = &self.shared.log.capture;
        logger.info("Starting capture from all cameras");

        let raw = self.with_still_mode(|shared, hw| shared.capture_batch_locked(hw))?;

        let report = self.shared.finish_batch(raw).inspect_err(|e| {
            logger.error(&format!("Composition failed: {}", e));
        })?;

        logger.info(&format!(
            "Capture {} done: {}/{} slot(s), grid {}",
            report.captured_at,
            report.succeeded(),
            report.slots.len(),
            report.grid_filename
        ));
        Ok(report)
    }

    /// Captures one slot at full resolution and saves it
    ///
    /// # Returns
    /// * `Err(CameraError::InvalidSlot)` - Slot out of range or non-functional
    /// * `Err(CameraError::Capture)` - Sensor read failed
    pub fn capture_single(&self, slot: Slot) -> Result<SlotCapture> {
        self.check_target(MuxTarget::Slot(slot))?;
        let logger = &self.shared.log.capture;
        logger.info(&format!("Starting capture from slot {}", slot));

        let mut frame = self.with_still_mode(|shared, hw| shared.capture_slot_locked(hw, slot))?;

        let stamp = self.shared.store.next_stamp();
        let name = slot_filename(&stamp, slot);
        draw_crosshair(&mut frame)?;
        let bytes = encode_jpeg(&frame, self.shared.config.composition.jpeg_quality)?;
        self.shared.store.write_batch(&[(name.clone(), bytes)])?;

        logger.info(&format!("Saved {}", name));
        Ok(SlotCapture::captured(slot, name))
    }
}
