use serde::{Deserialize, Serialize};

/// Camera and multiplexer addressing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// I2C bus number (`/dev/i2c-<bus>`)
    pub i2c_bus: u8,
    /// 7-bit I2C address of the multiplexer
    pub mux_address: u16,
    /// Register the select code is written to
    pub select_register: u8,
    /// Video device index handed to the capture backend
    pub camera_device: i32,
    /// Number of sensor slots behind the multiplexer
    pub camera_count: u8,
    /// Slots that are never addressed
    pub non_functional_slots: Vec<u8>,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        HardwareConfig {
            i2c_bus: 11,
            mux_address: 0x24,
            select_register: 0x24,
            camera_device: 0,
            camera_count: 4,
            non_functional_slots: vec![3],
        }
    }
}

impl HardwareConfig {
    pub fn i2c_device_path(&self) -> String {
        format!("/dev/i2c-{}", self.i2c_bus)
    }

    pub fn is_functional(&self, slot: u8) -> bool {
        slot < self.camera_count && !self.non_functional_slots.contains(&slot)
    }

    /// Functional slots in index order
    pub fn functional_slots(&self) -> Vec<u8> {
        (0..self.camera_count)
            .filter(|&slot| self.is_functional(slot))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rig() {
        let config = HardwareConfig::default();
        assert_eq!(config.i2c_device_path(), "/dev/i2c-11");
        assert_eq!(config.functional_slots(), vec![0, 1, 2]);
        assert!(!config.is_functional(3));
        assert!(!config.is_functional(4));
    }

    #[test]
    fn test_all_slots_functional() {
        let config = HardwareConfig {
            non_functional_slots: Vec::new(),
            ..HardwareConfig::default()
        };
        assert_eq!(config.functional_slots(), vec![0, 1, 2, 3]);
    }
}
