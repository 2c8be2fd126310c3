//! Linux I2C multiplexer channel.

use super::MuxChannel;
use crate::error::{CameraError, Result};
use logging::Logger;

#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;
#[cfg(target_os = "linux")]
use i2cdev::linux::LinuxI2CDevice;

/// Multiplexer reached through `/dev/i2c-<bus>`
pub struct I2cMux {
    #[cfg(target_os = "linux")]
    device: Option<LinuxI2CDevice>,
    #[cfg(not(target_os = "linux"))]
    device: Option<()>,
    path: String,
    address: u16,
    logger: Logger,
}

impl I2cMux {
    /// Opens the bus device at the multiplexer address
    ///
    /// # Arguments
    /// * `bus` - I2C bus number
    /// * `address` - 7-bit device address
    /// * `logger` - Component logger
    ///
    /// # Returns
    /// * `Err(CameraError::HardwareInit)` - Bus missing, busy or not permitted
    #[cfg(target_os = "linux")]
    pub fn open(bus: u8, address: u16, logger: Logger) -> Result<Self> {
        let path = format!("/dev/i2c-{}", bus);
        let device = LinuxI2CDevice::new(&path, address).map_err(|e| {
            CameraError::HardwareInit(format!(
                "Failed to open {} at 0x{:02x}: {}",
                path, address, e
            ))
        })?;

        logger.info(&format!("Opened {} at 0x{:02x}", path, address));

        Ok(I2cMux {
            device: Some(device),
            path,
            address,
            logger,
        })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn open(bus: u8, address: u16, logger: Logger) -> Result<Self> {
        let _ = logger;
        Err(CameraError::HardwareInit(format!(
            "I2C bus {} (0x{:02x}) is only available on Linux",
            bus, address
        )))
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl MuxChannel for I2cMux {
    #[cfg(target_os = "linux")]
    fn write_byte_data(&mut self, register: u8, value: u8) -> Result<()> {
        let device = self
            .device
            .as_mut()
            .ok_or_else(|| CameraError::Select(format!("{} is closed", self.path)))?;

        device.smbus_write_byte_data(register, value).map_err(|e| {
            CameraError::Select(format!(
                "Write 0x{:02x} to register 0x{:02x} on {} (0x{:02x}) failed: {}",
                value, register, self.path, self.address, e
            ))
        })
    }

    #[cfg(not(target_os = "linux"))]
    fn write_byte_data(&mut self, register: u8, value: u8) -> Result<()> {
        Err(CameraError::Select(format!(
            "Write 0x{:02x} to register 0x{:02x} on {}: unsupported platform",
            value, register, self.path
        )))
    }

    fn close(&mut self) -> Result<()> {
        if self.device.take().is_some() {
            self.logger.info(&format!("Closed {}", self.path));
        }
        Ok(())
    }
}

impl Drop for I2cMux {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
