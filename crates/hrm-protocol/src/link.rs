//! Interfaces between a byte link and its consumers.
//!
//! A connection pushes received chunks into a [`DataListener`] and reports
//! its lifecycle to a [`ReadyStateListener`]. The framing engine only needs
//! the first one.

use crate::error::HrmError;

/// Receives raw byte chunks as they arrive on a link.
pub trait DataListener {
    /// Called once per received chunk. `data` is never empty.
    fn on_data(&mut self, data: &[u8]);
}

impl<F> DataListener for F
where
    F: FnMut(&[u8]),
{
    fn on_data(&mut self, data: &[u8]) {
        self(data)
    }
}

/// Receives link lifecycle notifications.
pub trait ReadyStateListener {
    /// The link to `device` is open and data may start flowing.
    fn on_ready(&mut self, device: &str);

    /// The link to `device` could not be opened or broke down.
    fn on_error(&mut self, device: &str, error: &HrmError);
}

/// A [`ReadyStateListener`] that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReadyStateListener;

impl ReadyStateListener for LoggingReadyStateListener {
    fn on_ready(&mut self, device: &str) {
        log::info!("link to {} ready", device);
    }

    fn on_error(&mut self, device: &str, error: &HrmError) {
        log::error!("link to {} failed: {}", device, error);
    }
}
