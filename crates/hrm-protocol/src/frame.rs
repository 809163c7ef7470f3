//! Frame layout and field decoding.
//!
//! Every Wearlink packet is exactly [`FRAME_LENGTH`] bytes:
//!
//! ```text
//! +-----+-----+-----+-----+--------+----+---------+---------+
//! | hdr | len | chk | seq | status | hr | rr_high | rr_low  |
//! +-----+-----+-----+-----+--------+----+---------+---------+
//! ```
//!
//! Decoding never fails. Only the status and heart rate bytes make it into a
//! [`Reading`]; the other fields are available through [`Frame`] accessors but
//! nothing in the decode path checks them.

use crate::constants::*;
use crate::types::Reading;

/// Decode the reading carried by one frame.
///
/// Takes the status byte at offset 4 and the heart rate byte at offset 5 as
/// they are. Header, checksum and sequence are not looked at.
pub fn decode_frame(bytes: &[u8; FRAME_LENGTH]) -> Reading {
    Reading::from_fields(bytes[INDEX_STATUS], bytes[INDEX_HEART_RATE])
}

/// One raw frame as it came off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LENGTH]);

impl Frame {
    /// Build a well-formed frame with a correct header, length and checksum.
    pub fn new(sequence: u8, status: u8, heart_rate: u8, rr_interval: u16) -> Self {
        let length = FRAME_LENGTH as u8;
        let rr = rr_interval.to_be_bytes();
        Frame([
            HEADER,
            length,
            0xFF - length,
            sequence & SEQUENCE_MASK,
            status,
            heart_rate,
            rr[0],
            rr[1],
        ])
    }

    /// Wrap raw bytes without inspecting them.
    pub fn from_bytes(bytes: [u8; FRAME_LENGTH]) -> Self {
        Frame(bytes)
    }

    /// Wrap a slice of exactly [`FRAME_LENGTH`] bytes.
    ///
    /// Returns `None` for any other length.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; FRAME_LENGTH]>::try_from(bytes).ok().map(Frame)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; FRAME_LENGTH] {
        &self.0
    }

    pub fn header(&self) -> u8 {
        self.0[INDEX_HEADER]
    }

    pub fn length(&self) -> u8 {
        self.0[INDEX_LENGTH]
    }

    pub fn checksum(&self) -> u8 {
        self.0[INDEX_CHECKSUM]
    }

    /// Rolling sequence counter, 0 to 15.
    pub fn sequence(&self) -> u8 {
        self.0[INDEX_SEQUENCE] & SEQUENCE_MASK
    }

    pub fn status(&self) -> u8 {
        self.0[INDEX_STATUS]
    }

    /// Upper nibble of the status byte.
    pub fn battery_level(&self) -> u8 {
        (self.status() >> 4) & MAX_BATTERY_LEVEL
    }

    pub fn beat_detected(&self) -> bool {
        self.status() & STATUS_BEAT_DETECTED != 0
    }

    pub fn heart_rate(&self) -> u8 {
        self.0[INDEX_HEART_RATE]
    }

    /// RR interval, big-endian.
    pub fn rr_interval(&self) -> u16 {
        u16::from_be_bytes([self.0[INDEX_RR_INTERVAL], self.0[INDEX_RR_INTERVAL + 1]])
    }

    /// Whether the header byte is the expected marker.
    pub fn has_header(&self) -> bool {
        self.header() == HEADER
    }

    /// Whether `checksum == 0xFF - length`.
    pub fn checksum_matches(&self) -> bool {
        self.checksum() == 0xFF - self.length()
    }

    /// The decoded reading.
    pub fn reading(&self) -> Reading {
        decode_frame(&self.0)
    }
}

impl From<Frame> for Reading {
    fn from(frame: Frame) -> Self {
        frame.reading()
    }
}
