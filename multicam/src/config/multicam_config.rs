use super::{
    CompositionConfig, HardwareConfig, LoggingConfig, ModeConfig, StorageConfig, TimingConfig,
};
use crate::error::{CameraError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding an inline JSON configuration
pub const INLINE_CONFIG_ENV: &str = "MULTICAM_CONFIG";

/// Filename searched by `config_loader` when no path is given
pub const CONFIG_FILENAME: &str = "multicam_config.json";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MulticamConfig {
    pub hardware: HardwareConfig,
    pub timing: TimingConfig,
    pub preview: ModeConfig,
    pub still: ModeConfig,
    pub composition: CompositionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Default for MulticamConfig {
    fn default() -> Self {
        MulticamConfig {
            hardware: HardwareConfig::default(),
            timing: TimingConfig::default(),
            preview: ModeConfig::preview(),
            still: ModeConfig::still(),
            composition: CompositionConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Inline,
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Inline => write!(f, "${}", INLINE_CONFIG_ENV),
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
            ConfigOrigin::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl MulticamConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: MulticamConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = config_loader::load_config_file(path)?;
        Self::from_json(&content)
    }

    /// Loads the configuration in precedence order:
    /// 1. `MULTICAM_CONFIG` holding inline JSON
    /// 2. `explicit_path` (the `--config` argument)
    /// 3. `multicam_config.json` located by `config_loader`
    /// 4. defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        if let Ok(inline) = env::var(INLINE_CONFIG_ENV) {
            if !inline.trim().is_empty() {
                return Ok((Self::from_json(&inline)?, ConfigOrigin::Inline));
            }
        }

        if let Some(path) = explicit_path {
            let config = Self::from_file(path)?;
            return Ok((config, ConfigOrigin::File(path.to_path_buf())));
        }

        match config_loader::find_and_load(CONFIG_FILENAME) {
            Ok((found, content)) => {
                let config = Self::from_json(&content)?;
                Ok((config, ConfigOrigin::File(found.path)))
            }
            Err(config_loader::ConfigError::FileNotFound(_)) => {
                let config = Self::default();
                config.validate()?;
                Ok((config, ConfigOrigin::Defaults))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let hw = &self.hardware;

        if hw.camera_count == 0 || hw.camera_count > 4 {
            return Err(invalid(format!(
                "camera_count must be between 1 and 4, got {}",
                hw.camera_count
            )));
        }

        if let Some(slot) = hw
            .non_functional_slots
            .iter()
            .find(|&&slot| slot >= hw.camera_count)
        {
            return Err(invalid(format!(
                "non-functional slot {} is outside 0..{}",
                slot, hw.camera_count
            )));
        }

        if hw.functional_slots().is_empty() {
            return Err(invalid("no functional camera slots".to_string()));
        }

        for (name, mode) in [("preview", &self.preview), ("still", &self.still)] {
            if mode.width == 0 || mode.height == 0 {
                return Err(invalid(format!(
                    "{} resolution must be non-zero, got {}x{}",
                    name, mode.width, mode.height
                )));
            }
            if let Some(gains) = mode.colour_gains {
                if !(gains.red > 0.0 && gains.blue > 0.0) {
                    return Err(invalid(format!(
                        "{} colour gains must be positive, got ({}, {})",
                        name, gains.red, gains.blue
                    )));
                }
            }
        }

        let comp = &self.composition;
        if comp.cell_width == 0 || comp.cell_height == 0 {
            return Err(invalid(format!(
                "grid cell must be non-zero, got {}x{}",
                comp.cell_width, comp.cell_height
            )));
        }
        if !(1..=100).contains(&comp.jpeg_quality) {
            return Err(invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                comp.jpeg_quality
            )));
        }

        self.logging
            .log_level
            .parse::<logging::LogLevel>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(())
    }
}

fn invalid(msg: String) -> CameraError {
    CameraError::Config(msg)
}
