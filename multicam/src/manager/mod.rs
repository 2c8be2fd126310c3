//! Camera manager.
//!
//! Owns the camera session and the multiplexer channel and serializes every
//! hardware operation on them.
//!
//! # Locking
//! Two mutexes, always taken in this order:
//! 1. the operation lock (`operation`, holding the cycle task handle), which
//!    serializes logical operations: select, cycle start/stop, capture, cleanup
//! 2. the hardware lock (`Shared::hardware`), held for the whole hardware
//!    section of an operation
//!
//! The cycle task and preview frames only ever take the hardware lock, so an
//! operation can stop and join the cycle task while holding the operation
//! lock without deadlocking. `current_slot`, `is_cycling` and the active mode
//! are kept outside both locks and read as a best-effort snapshot.

mod capture;
mod cycle;
mod preview;
mod report;

pub use preview::{PreviewFrames, multipart_chunk};
pub use report::{CaptureReport, CaptureResponse, ManagerStatus, SlotCapture};

use crate::config::{ModeConfig, MulticamConfig};
use crate::error::{CameraError, Result};
use crate::mux::{self, I2cMux, MuxChannel, MuxTarget};
use crate::session::{CameraSession, OpenCvSession, SensorMode};
use crate::storage::CaptureStore;
use cycle::CycleHandle;
use logging::Logger;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Locks a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, logger: &Logger, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        logger.error(&format!("{} mutex poisoned, recovering", what));
        poisoned.into_inner()
    })
}

/// The open hardware handles
pub(crate) struct Hardware {
    session: Box<dyn CameraSession>,
    mux: Box<dyn MuxChannel>,
}

/// One logger per manager component, sharing a single writer
#[derive(Clone)]
pub(crate) struct Loggers {
    manager: Logger,
    cycle: Logger,
    capture: Logger,
    preview: Logger,
}

impl Loggers {
    fn new(root: &Logger) -> Self {
        Loggers {
            manager: root.for_component("camera_manager"),
            cycle: root.for_component("cycle"),
            capture: root.for_component("capture"),
            preview: root.for_component("preview"),
        }
    }
}

/// State shared with the cycle task and preview iterators
pub(crate) struct Shared {
    config: MulticamConfig,
    hardware: Mutex<Option<Hardware>>,
    current: Mutex<Option<MuxTarget>>,
    mode: Mutex<Option<SensorMode>>,
    is_cycling: AtomicBool,
    cycle_interval_ms: AtomicU64,
    closed: AtomicBool,
    store: CaptureStore,
    log: Loggers,
}

impl Shared {
    fn lock_hardware(&self) -> MutexGuard<'_, Option<Hardware>> {
        lock_or_recover(&self.hardware, &self.log.manager, "Hardware")
    }

    fn current_target(&self) -> Option<MuxTarget> {
        *lock_or_recover(&self.current, &self.log.manager, "Current slot")
    }

    fn set_current(&self, target: Option<MuxTarget>) {
        *lock_or_recover(&self.current, &self.log.manager, "Current slot") = target;
    }

    fn active_mode(&self) -> Option<SensorMode> {
        *lock_or_recover(&self.mode, &self.log.manager, "Mode")
    }

    fn set_mode(&self, mode: Option<SensorMode>) {
        *lock_or_recover(&self.mode, &self.log.manager, "Mode") = mode;
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn mode_config(&self, mode: SensorMode) -> &ModeConfig {
        match mode {
            SensorMode::Preview => &self.config.preview,
            SensorMode::Still => &self.config.still,
        }
    }

    /// Routes `target` to the capture pipeline. Caller holds the hardware lock.
    ///
    /// On a failed write the recorded target is left unchanged.
    fn select_locked(&self, hardware: &mut Hardware, target: MuxTarget) -> Result<()> {
        let code = mux::select_code(target)?;
        hardware
            .mux
            .write_byte_data(self.config.hardware.select_register, code)?;
        self.set_current(Some(target));

        thread::sleep(self.config.timing.switch_delay());
        self.log
            .manager
            .debug(&format!("Selected {} (code 0x{:02x})", target, code));
        Ok(())
    }

    /// Reconfigures the session. Caller holds the hardware lock.
    fn apply_mode_locked(&self, hardware: &mut Hardware, mode: SensorMode) -> Result<()> {
        // Unknown until the new configuration is confirmed
        self.set_mode(None);
        hardware.session.apply_mode(mode, self.mode_config(mode))?;
        self.set_mode(Some(mode));
        Ok(())
    }

    fn bring_up(&self, hardware: &mut Hardware) -> Result<()> {
        self.apply_mode_locked(hardware, SensorMode::Preview)?;
        self.select_locked(hardware, MuxTarget::All)
    }
}

/// Coordinates the camera session, the multiplexer, background cycling and
/// multi-camera capture
pub struct CameraManager {
    shared: Arc<Shared>,
    operation: Mutex<Option<CycleHandle>>,
}

impl CameraManager {
    /// Opens the camera device and I2C bus named in `config`
    ///
    /// # Arguments
    /// * `config` - Validated configuration
    /// * `logger` - Root logger; components derive their own from it
    ///
    /// # Returns
    /// * `Err(CameraError::HardwareInit)` - Camera busy or missing, bus unreachable
    pub fn initialize(config: MulticamConfig, logger: Logger) -> Result<Self> {
        config.validate()?;
        let hw = &config.hardware;

        let session = OpenCvSession::open(hw.camera_device, logger.for_component("session"))?;
        let mux = I2cMux::open(hw.i2c_bus, hw.mux_address, logger.for_component("mux"))?;

        Self::with_hardware(config, Box::new(session), Box::new(mux), logger)
    }

    /// Builds a manager over already opened hardware
    ///
    /// Applies the preview configuration and selects four-in-one mode. On
    /// failure both handles are released before returning.
    pub fn with_hardware(
        config: MulticamConfig,
        session: Box<dyn CameraSession>,
        mux: Box<dyn MuxChannel>,
        logger: Logger,
    ) -> Result<Self> {
        config.validate()?;
        let log = Loggers::new(&logger);

        let store = CaptureStore::open(
            &config.storage.captures_dir,
            config.storage.dir_mode,
            config.storage.file_mode,
            logger.for_component("storage"),
        )?;

        let cycle_interval_ms = config.timing.cycle_interval_ms;
        let mut shared = Shared {
            config,
            hardware: Mutex::new(None),
            current: Mutex::new(None),
            mode: Mutex::new(None),
            is_cycling: AtomicBool::new(false),
            cycle_interval_ms: AtomicU64::new(cycle_interval_ms),
            closed: AtomicBool::new(false),
            store,
            log,
        };

        let mut hardware = Hardware { session, mux };
        if let Err(e) = shared.bring_up(&mut hardware) {
            shared
                .log
                .manager
                .error(&format!("Hardware bring-up failed: {}", e));
            let _ = hardware.session.release();
            let _ = hardware.mux.close();
            return Err(match e {
                CameraError::HardwareInit(_) => e,
                other => CameraError::HardwareInit(other.to_string()),
            });
        }

        *shared
            .hardware
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(hardware);

        let functional = shared.config.hardware.functional_slots();
        shared.log.manager.info(&format!(
            "Camera manager ready: {} slot(s), functional {:?}, preview {}x{}",
            shared.config.hardware.camera_count,
            functional,
            shared.config.preview.width,
            shared.config.preview.height
        ));

        Ok(CameraManager {
            shared: Arc::new(shared),
            operation: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &MulticamConfig {
        &self.shared.config
    }

    fn logger(&self) -> &Logger {
        &self.shared.log.manager
    }

    fn lock_operation(&self) -> MutexGuard<'_, Option<CycleHandle>> {
        lock_or_recover(&self.operation, self.logger(), "Operation")
    }

    fn check_target(&self, target: MuxTarget) -> Result<()> {
        if let MuxTarget::Slot(slot) = target {
            let hw = &self.shared.config.hardware;
            if slot.0 >= hw.camera_count {
                return Err(CameraError::InvalidSlot(format!(
                    "slot {} is outside 0..{}",
                    slot, hw.camera_count
                )));
            }
            if !hw.is_functional(slot.0) {
                return Err(CameraError::InvalidSlot(format!(
                    "slot {} is marked non-functional",
                    slot
                )));
            }
        }
        Ok(())
    }

    /// Pins the multiplexer to one slot or four-in-one mode
    ///
    /// Stops cycling first. A non-functional slot is rejected without
    /// touching the bus.
    pub fn select(&self, target: MuxTarget) -> Result<()> {
        self.check_target(target)?;

        let mut operation = self.lock_operation();
        if self.stop_cycle_locked(&mut operation).is_some() {
            self.logger().info("Cycling stopped by manual selection");
        }

        let mut hardware = self.shared.lock_hardware();
        let hw = hardware.as_mut().ok_or(CameraError::SessionClosed)?;

        match self.shared.select_locked(hw, target) {
            Ok(()) => {
                self.logger().info(&format!("Camera {} selected", target));
                Ok(())
            }
            Err(e) => {
                self.logger()
                    .error(&format!("Failed to select {}: {}", target, e));
                Err(e)
            }
        }
    }

    /// Starts stepping through the functional slots
    ///
    /// No-op when already cycling.
    ///
    /// # Arguments
    /// * `interval` - Time on each slot; `None` uses the configured interval
    pub fn start_camera_cycle(&self, interval: Option<Duration>) -> Result<()> {
        let interval = interval.unwrap_or_else(|| self.shared.config.timing.cycle_interval());
        if interval.is_zero() {
            return Err(CameraError::Config(
                "cycle interval must be greater than zero".to_string(),
            ));
        }

        let mut operation = self.lock_operation();
        if operation.is_some() {
            self.logger().debug("Cycle already running");
            return Ok(());
        }
        self.start_cycle_locked(&mut operation, interval)
    }

    /// Stops cycling and waits for the cycle task to exit
    ///
    /// Once this returns no further select is issued by the task.
    ///
    /// # Returns
    /// `true` if cycling was active
    pub fn stop_camera_cycle(&self) -> bool {
        let mut operation = self.lock_operation();
        self.stop_cycle_locked(&mut operation).is_some()
    }

    fn start_cycle_locked(&self, operation: &mut Option<CycleHandle>, interval: Duration) -> Result<()> {
        if self.shared.is_closed() {
            return Err(CameraError::SessionClosed);
        }

        let handle = CycleHandle::spawn(Arc::clone(&self.shared), interval)?;
        *operation = Some(handle);

        self.shared
            .cycle_interval_ms
            .store(interval.as_millis() as u64, Ordering::SeqCst);
        self.shared.is_cycling.store(true, Ordering::SeqCst);
        self.logger().info(&format!(
            "Cycling started ({} ms per slot)",
            interval.as_millis()
        ));
        Ok(())
    }

    /// Returns the interval of the stopped task, or `None` if none was running
    fn stop_cycle_locked(&self, operation: &mut Option<CycleHandle>) -> Option<Duration> {
        let handle = operation.take()?;
        let interval = handle.interval();

        handle.stop(self.shared.config.timing.cycle_stop_warn(), self.logger());
        self.shared.is_cycling.store(false, Ordering::SeqCst);
        self.logger().info("Cycling stopped");
        Some(interval)
    }

    /// Snapshot of the manager state
    ///
    /// Does not take the hardware lock, so it never waits on a capture.
    pub fn get_status(&self) -> ManagerStatus {
        ManagerStatus {
            current_slot: self.shared.current_target(),
            is_cycling: self.shared.is_cycling.load(Ordering::SeqCst),
            camera_count: self.shared.config.hardware.camera_count,
            cycle_interval_ms: self.shared.cycle_interval_ms.load(Ordering::SeqCst),
            latest_capture: self.shared.store.latest_grid(),
            active_mode: self.shared.active_mode(),
        }
    }

    /// Mode the session is in, `None` after cleanup or a failed switch
    pub fn active_mode(&self) -> Option<SensorMode> {
        self.shared.active_mode()
    }

    /// Lazy JPEG frames from the current selection
    pub fn preview_frames(&self) -> PreviewFrames {
        PreviewFrames::new(Arc::clone(&self.shared))
    }

    /// Stops cycling and releases the camera and the bus
    ///
    /// Blocks until any in-flight hardware operation finishes. Calling it
    /// again is a no-op.
    pub fn cleanup(&self) -> Result<()> {
        let mut operation = self.lock_operation();
        self.stop_cycle_locked(&mut operation);

        let taken = {
            let mut hardware = self.shared.lock_hardware();
            self.shared.closed.store(true, Ordering::SeqCst);
            hardware.take()
        };

        let Some(mut hardware) = taken else {
            return Ok(());
        };

        self.logger().info("Releasing camera hardware");
        let released = hardware.session.release();
        let closed = hardware.mux.close();

        self.shared.set_current(None);
        self.shared.set_mode(None);

        if let Err(e) = &released {
            self.logger()
                .error(&format!("Camera release failed: {}", e));
        }
        if let Err(e) = &closed {
            self.logger().error(&format!("I2C close failed: {}", e));
        }
        released.and(closed)
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            self.logger()
                .error(&format!("Cleanup on drop failed: {}", e));
        }
    }
}
