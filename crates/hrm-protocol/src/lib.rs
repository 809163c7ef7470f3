//! Polar Bluetooth Wearlink heart-rate protocol
//!
//! This crate turns the raw byte stream of a Polar Wearlink heart-rate monitor
//! (as delivered by an RFCOMM serial link) into decoded readings.
//!
//! # Protocol Overview
//!
//! The monitor streams fixed-length 8-byte packets with no escaping:
//!
//! ```text
//!  Hdr Len Chk Seq Status HeartRate RRInterval_16-bits
//!   FE  08  F7  06   F1      48          03 64
//! ```
//!
//! - `Hdr` is always `0xFE`
//! - `Chk` is `0xFF - Len`
//! - `Seq` counts 0 to 15
//! - the upper nibble of `Status` is the battery level, bit 0 the beat flag
//!
//! The link delivers this stream in chunks that need not line up with packet
//! boundaries. [`FrameAssembler`] reassembles the packets and recovers
//! alignment when a chunk starts with the header byte. [`HeartRateMonitor`]
//! wraps it with event listeners and the last known reading.
//!
//! # Example
//!
//! ```rust,ignore
//! use hrm_protocol::{HeartRateMonitor, DataListener};
//!
//! let mut monitor = HeartRateMonitor::new();
//! monitor.subscribe(|event| println!("{}", event.reading));
//!
//! // From the link's receive callback
//! monitor.on_data(&received_chunk);
//! println!("battery: {}", monitor.battery_level());
//! ```

mod assembler;
mod constants;
mod error;
mod events;
mod frame;
mod link;
mod monitor;
mod types;

pub use assembler::*;
pub use constants::*;
pub use error::*;
pub use events::*;
pub use frame::*;
pub use link::*;
pub use monitor::*;
pub use types::*;
