use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed delays and intervals, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after every multiplexer write
    pub switch_delay_ms: u64,
    /// Wait after entering still mode before the first capture
    pub stabilization_delay_ms: u64,
    /// Extra wait after selecting a slot inside a capture batch
    pub slot_settle_delay_ms: u64,
    /// Default interval between cycling ticks
    pub cycle_interval_ms: u64,
    /// Minimum spacing between preview frames
    pub preview_frame_interval_ms: u64,
    /// A preview capture slower than this is treated as a freeze
    pub freeze_threshold_ms: u64,
    /// Sleep after a failed or frozen preview capture
    pub preview_error_backoff_ms: u64,
    /// Stopping the cycle task logs a warning after this long
    pub cycle_stop_warn_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            switch_delay_ms: 500,
            stabilization_delay_ms: 1000,
            slot_settle_delay_ms: 500,
            cycle_interval_ms: 1000,
            preview_frame_interval_ms: 100,
            freeze_threshold_ms: 2000,
            preview_error_backoff_ms: 500,
            cycle_stop_warn_ms: 5000,
        }
    }
}

impl TimingConfig {
    /// All delays zeroed, intervals kept short. Used by tests and dry runs.
    pub fn immediate() -> Self {
        TimingConfig {
            switch_delay_ms: 0,
            stabilization_delay_ms: 0,
            slot_settle_delay_ms: 0,
            cycle_interval_ms: 5,
            preview_frame_interval_ms: 0,
            freeze_threshold_ms: 1000,
            preview_error_backoff_ms: 0,
            cycle_stop_warn_ms: 1000,
        }
    }

    pub fn switch_delay(&self) -> Duration {
        Duration::from_millis(self.switch_delay_ms)
    }

    pub fn stabilization_delay(&self) -> Duration {
        Duration::from_millis(self.stabilization_delay_ms)
    }

    pub fn slot_settle_delay(&self) -> Duration {
        Duration::from_millis(self.slot_settle_delay_ms)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn preview_frame_interval(&self) -> Duration {
        Duration::from_millis(self.preview_frame_interval_ms)
    }

    pub fn freeze_threshold(&self) -> Duration {
        Duration::from_millis(self.freeze_threshold_ms)
    }

    pub fn preview_error_backoff(&self) -> Duration {
        Duration::from_millis(self.preview_error_backoff_ms)
    }

    pub fn cycle_stop_warn(&self) -> Duration {
        Duration::from_millis(self.cycle_stop_warn_ms)
    }
}
