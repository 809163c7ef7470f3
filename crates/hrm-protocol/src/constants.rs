//! Protocol constants
//!
//! Wire layout of a Polar Bluetooth Wearlink packet and the defaults used by
//! the frame assembler and the heart-rate monitor.
//!
//! ```text
//!  Hdr Len Chk Seq Status HeartRate RRInterval_16-bits
//!   FE  08  F7  06   F1      48          03 64
//! ```

// ============================================================================
// Frame Layout
// ============================================================================

/// Header marker byte at the start of every aligned frame.
pub const HEADER: u8 = 0xFE;
/// Length of one frame on the wire, in bytes.
pub const FRAME_LENGTH: usize = 8;

/// Offset of the header byte.
pub const INDEX_HEADER: usize = 0;
/// Offset of the length indicator.
pub const INDEX_LENGTH: usize = 1;
/// Offset of the checksum byte (`0xFF - length`).
pub const INDEX_CHECKSUM: usize = 2;
/// Offset of the 4-bit rolling sequence counter.
pub const INDEX_SEQUENCE: usize = 3;
/// Offset of the status byte.
pub const INDEX_STATUS: usize = 4;
/// Offset of the heart rate byte.
pub const INDEX_HEART_RATE: usize = 5;
/// Offset of the high byte of the RR interval.
pub const INDEX_RR_INTERVAL: usize = 6;

/// Mask for the sequence counter (range 0 to 15).
pub const SEQUENCE_MASK: u8 = 0x0F;
/// Bit 0 of the status byte is the beat detection flag.
pub const STATUS_BEAT_DETECTED: u8 = 0x01;
/// Highest battery level the status nibble can encode.
pub const MAX_BATTERY_LEVEL: u8 = 0x0F;

// ============================================================================
// Defaults
// ============================================================================

/// Heart rate reported through the integer accessor before any frame was decoded.
pub const NO_HEART_RATE: i32 = -1;
/// Battery level reported before any frame was decoded.
pub const DEFAULT_BATTERY_LEVEL: u8 = MAX_BATTERY_LEVEL;
/// Status byte reported before any frame was decoded.
pub const DEFAULT_STATUS: u8 = 0;

/// Default capacity of the assembly buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4 * FRAME_LENGTH;
/// Smallest accepted assembly buffer capacity.
pub const MIN_BUFFER_CAPACITY: usize = 2 * FRAME_LENGTH;

// ============================================================================
// Event Payload Keys
// ============================================================================

/// Payload key for the raw status byte.
pub const KEY_STATUS: &str = "status";
/// Payload key for the battery level.
pub const KEY_BATTERY_LEVEL: &str = "batteryLevel";
/// Payload key for the heart rate.
pub const KEY_HEART_RATE: &str = "heartRate";
