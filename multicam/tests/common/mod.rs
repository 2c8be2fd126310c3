//! Recording fakes for the camera session and multiplexer.

#![allow(dead_code)]

use logging::{LogLevel, Logger};
use multicam::config::TimingConfig;
use multicam::{
    CameraError, CameraManager, CameraSession, ModeConfig, MulticamConfig, MuxChannel, Result,
    SensorMode, VideoFrame,
};
use opencv::core::{CV_8UC3, Mat, Scalar};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

/// Hardware call observed by the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwEvent {
    Select(u8),
    Mode(SensorMode),
    Capture(u8),
    Release,
    Close,
}

#[derive(Default)]
pub struct RigState {
    pub events: Vec<HwEvent>,
    pub active_code: u8,
    pub size: (i32, i32),
    pub failing_codes: HashSet<u8>,
}

/// State shared between the fake session and the fake mux
#[derive(Clone, Default)]
pub struct Rig(pub Arc<Mutex<RigState>>);

impl Rig {
    pub fn events(&self) -> Vec<HwEvent> {
        self.0.lock().unwrap().events.clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().events.clear();
    }

    pub fn fail_code(&self, code: u8) {
        self.0.lock().unwrap().failing_codes.insert(code);
    }

    pub fn selects(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HwEvent::Select(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    pub fn captures(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HwEvent::Capture(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    pub fn modes(&self) -> Vec<SensorMode> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HwEvent::Mode(mode) => Some(mode),
                _ => None,
            })
            .collect()
    }
}

pub struct RecordingMux {
    rig: Rig,
}

impl MuxChannel for RecordingMux {
    fn write_byte_data(&mut self, _register: u8, value: u8) -> Result<()> {
        let mut state = self.rig.0.lock().unwrap();
        state.events.push(HwEvent::Select(value));
        state.active_code = value;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.rig.0.lock().unwrap().events.push(HwEvent::Close);
        Ok(())
    }
}

pub struct RecordingSession {
    rig: Rig,
    released: bool,
}

impl CameraSession for RecordingSession {
    fn apply_mode(&mut self, mode: SensorMode, config: &ModeConfig) -> Result<()> {
        let mut state = self.rig.0.lock().unwrap();
        state.events.push(HwEvent::Mode(mode));
        state.size = (config.width as i32, config.height as i32);
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<VideoFrame> {
        if self.released {
            return Err(CameraError::SessionClosed);
        }
        let mut state = self.rig.0.lock().unwrap();
        let code = state.active_code;
        state.events.push(HwEvent::Capture(code));

        if state.failing_codes.contains(&code) {
            return Err(CameraError::Capture(format!("sensor behind 0x{:02x} timed out", code)));
        }

        let (w, h) = state.size;
        let mat = Mat::new_rows_cols_with_default(h, w, CV_8UC3, Scalar::new(30.0, 160.0, 90.0, 0.0))?;
        VideoFrame::new(mat)
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.released = true;
            self.rig.0.lock().unwrap().events.push(HwEvent::Release);
        }
        Ok(())
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub rig: Rig,
    pub manager: CameraManager,
}

impl Harness {
    pub fn captures_dir(&self) -> PathBuf {
        self.dir.path().join("captures")
    }
}

/// Small frames and zero delays; slot 3 non-functional as on the real rig
pub fn test_config(dir: &TempDir) -> MulticamConfig {
    let mut config = MulticamConfig::default();
    config.timing = TimingConfig::immediate();
    config.preview = ModeConfig {
        width: 64,
        height: 48,
        ..ModeConfig::preview()
    };
    config.still = ModeConfig {
        width: 200,
        height: 150,
        ..ModeConfig::still()
    };
    config.composition.cell_width = 120;
    config.composition.cell_height = 90;
    config.storage.captures_dir = dir.path().join("captures").to_string_lossy().into_owned();
    config.logging.enable_console = false;
    config
}

pub fn harness_with(configure: impl FnOnce(&mut MulticamConfig)) -> Harness {
    let dir = tempdir().unwrap();
    let mut config = test_config(&dir);
    configure(&mut config);

    let rig = Rig::default();
    let logger = Logger::new(dir.path().join("multicam.log"), LogLevel::Debug, false).unwrap();
    let manager = CameraManager::with_hardware(
        config,
        Box::new(RecordingSession {
            rig: rig.clone(),
            released: false,
        }),
        Box::new(RecordingMux { rig: rig.clone() }),
        logger,
    )
    .unwrap();

    Harness { dir, rig, manager }
}

pub fn harness() -> Harness {
    harness_with(|_| {})
}
