//! Camera multiplexer addressing.
//!
//! The multiplexer is driven by one byte written to a fixed register. Each
//! slot has its own code and a fifth code selects the four-in-one
//! passthrough.

pub mod i2c;

pub use i2c::I2cMux;

use crate::error::{CameraError, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Select code for the four-in-one mode
pub const ALL_CODE: u8 = 0x00;

/// Select codes for slots 0..=3
pub const SLOT_CODES: [u8; 4] = [0x02, 0x12, 0x22, 0x32];

/// One addressable camera position behind the multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(pub u8);

impl Slot {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// One-based label shown on frames
    pub fn label(self) -> String {
        format!("Camera {}", u16::from(self.0) + 1)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the multiplexer routes to the capture pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuxTarget {
    Slot(Slot),
    All,
}

impl MuxTarget {
    pub fn slot(self) -> Option<Slot> {
        match self {
            MuxTarget::Slot(slot) => Some(slot),
            MuxTarget::All => None,
        }
    }
}

impl From<Slot> for MuxTarget {
    fn from(slot: Slot) -> Self {
        MuxTarget::Slot(slot)
    }
}

impl fmt::Display for MuxTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuxTarget::Slot(slot) => write!(f, "{}", slot),
            MuxTarget::All => write!(f, "all"),
        }
    }
}

impl FromStr for MuxTarget {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(MuxTarget::All);
        }
        trimmed
            .parse::<u8>()
            .map(|n| MuxTarget::Slot(Slot(n)))
            .map_err(|_| CameraError::InvalidSlot(format!("'{}' is not a slot or 'all'", s)))
    }
}

impl Serialize for MuxTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MuxTarget::Slot(slot) => serializer.serialize_u8(slot.0),
            MuxTarget::All => serializer.serialize_str("all"),
        }
    }
}

struct MuxTargetVisitor;

impl<'de> Visitor<'de> for MuxTargetVisitor {
    type Value = MuxTarget;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a slot number or \"all\"")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<MuxTarget, E> {
        u8::try_from(value)
            .map(|n| MuxTarget::Slot(Slot(n)))
            .map_err(|_| E::custom(format!("slot {} out of range", value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<MuxTarget, E> {
        u8::try_from(value)
            .map(|n| MuxTarget::Slot(Slot(n)))
            .map_err(|_| E::custom(format!("slot {} out of range", value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<MuxTarget, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for MuxTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(MuxTargetVisitor)
    }
}

/// Returns the byte written to the select register for `target`.
///
/// # Errors
/// `InvalidSlot` for slots beyond the four the multiplexer addresses.
pub fn select_code(target: MuxTarget) -> Result<u8> {
    match target {
        MuxTarget::All => Ok(ALL_CODE),
        MuxTarget::Slot(slot) => SLOT_CODES
            .get(slot.index())
            .copied()
            .ok_or_else(|| CameraError::InvalidSlot(format!("slot {} has no select code", slot))),
    }
}

/// Control channel to the multiplexer
///
/// Implemented by [`I2cMux`] on hardware and by recording fakes in tests.
pub trait MuxChannel: Send {
    /// Writes one byte to a register of the multiplexer
    ///
    /// # Errors
    /// `Select` when the bus write fails.
    fn write_byte_data(&mut self, register: u8, value: u8) -> Result<()>;

    /// Releases the bus handle. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}
