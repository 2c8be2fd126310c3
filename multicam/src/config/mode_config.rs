use serde::{Deserialize, Serialize};

/// Autofocus behaviour of a mode configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutofocusMode {
    /// Refocus continuously while streaming
    Continuous,
    /// Focus once after the mode is applied, then hold
    SingleShot,
}

/// Manual white balance gains relative to green
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColourGains {
    pub red: f64,
    pub blue: f64,
}

impl ColourGains {
    pub const UNITY: ColourGains = ColourGains {
        red: 1.0,
        blue: 1.0,
    };

    pub fn is_unity(&self) -> bool {
        (self.red - 1.0).abs() < f64::EPSILON && (self.blue - 1.0).abs() < f64::EPSILON
    }
}

/// One of the two mutually exclusive sensor configurations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub width: u32,
    pub height: u32,
    pub autofocus: AutofocusMode,
    /// `Some` disables auto white balance and applies these gains
    pub colour_gains: Option<ColourGains>,
    /// Frames discarded after the mode is applied
    pub warmup_frames: u32,
}

impl ModeConfig {
    /// 720p, continuous autofocus
    pub fn preview() -> Self {
        ModeConfig {
            width: 1280,
            height: 720,
            autofocus: AutofocusMode::Continuous,
            colour_gains: Some(ColourGains::UNITY),
            warmup_frames: 0,
        }
    }

    /// Full IMX519 resolution, single-shot autofocus, calibrated gains
    pub fn still() -> Self {
        ModeConfig {
            width: 4056,
            height: 3040,
            autofocus: AutofocusMode::SingleShot,
            colour_gains: Some(ColourGains {
                red: 0.9951,
                blue: 0.7410,
            }),
            warmup_frames: 3,
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::preview()
    }
}
