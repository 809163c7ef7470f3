//! Decoded reading type shared by the assembler, the monitor and event payloads.

use crate::constants::*;

/// The decoded, application-level content of one frame.
///
/// `heart_rate` is `None` only for the default reading a monitor holds before
/// its first frame; every decoded frame carries a heart rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Reading {
    /// Raw status byte.
    pub status: u8,
    /// Battery level, the upper nibble of the status byte (0-15).
    pub battery_level: u8,
    /// Heart rate in beats per minute.
    #[cfg_attr(feature = "serde", serde(with = "heart_rate_sentinel"))]
    pub heart_rate: Option<u8>,
}

impl Default for Reading {
    fn default() -> Self {
        Reading {
            status: DEFAULT_STATUS,
            battery_level: DEFAULT_BATTERY_LEVEL,
            heart_rate: None,
        }
    }
}

impl Reading {
    /// Build a reading from a status byte and a heart rate byte.
    pub fn from_fields(status: u8, heart_rate: u8) -> Self {
        Reading {
            status,
            battery_level: (status >> 4) & MAX_BATTERY_LEVEL,
            heart_rate: Some(heart_rate),
        }
    }

    /// Heart rate as an integer, [`NO_HEART_RATE`] when unknown.
    pub fn heart_rate_or_sentinel(&self) -> i32 {
        self.heart_rate.map_or(NO_HEART_RATE, i32::from)
    }

    /// Whether the beat detection flag is set in the status byte.
    pub fn beat_detected(&self) -> bool {
        self.status & STATUS_BEAT_DETECTED != 0
    }

    /// The reading as `(key, value)` pairs using the event payload key names.
    pub fn to_pairs(&self) -> [(&'static str, i32); 3] {
        [
            (KEY_STATUS, i32::from(self.status)),
            (KEY_BATTERY_LEVEL, i32::from(self.battery_level)),
            (KEY_HEART_RATE, self.heart_rate_or_sentinel()),
        ]
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.heart_rate {
            Some(bpm) => write!(f, "{} bpm", bpm)?,
            None => write!(f, "-- bpm")?,
        }
        write!(f, " (battery {}/{}, status 0x{:02X})", self.battery_level, MAX_BATTERY_LEVEL, self.status)
    }
}

/// Serializes an unknown heart rate as [`NO_HEART_RATE`], matching the payload
/// consumers already expect.
#[cfg(feature = "serde")]
mod heart_rate_sentinel {
    use super::NO_HEART_RATE;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(value.map_or(NO_HEART_RATE, i32::from))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
        let raw = i32::deserialize(deserializer)?;
        if raw < 0 {
            return Ok(None);
        }
        u8::try_from(raw)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("heart rate out of range: {}", raw)))
    }
}
