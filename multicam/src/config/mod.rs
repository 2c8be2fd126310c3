//! Manager configuration
//!
//! Every section has a `Default` matching the deployed four-sensor rig, so a
//! partial JSON file only needs the values that differ.

pub mod hardware_config;
pub mod logging_config;
pub mod mode_config;
pub mod multicam_config;
pub mod output_config;
pub mod timing_config;

pub use hardware_config::HardwareConfig;
pub use logging_config::LoggingConfig;
pub use mode_config::{AutofocusMode, ColourGains, ModeConfig};
pub use multicam_config::{ConfigOrigin, MulticamConfig};
pub use output_config::{CompositionConfig, StorageConfig};
pub use timing_config::TimingConfig;
