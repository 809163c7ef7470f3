//! Heart-rate monitor: the assembler, its listeners and the last reading.

use crate::assembler::{AssemblerStats, FrameAssembler, ResyncMode};
use crate::constants::DEFAULT_BUFFER_CAPACITY;
use crate::events::{EventDispatcher, HrmEvent, SubscriptionId};
use crate::link::DataListener;
use crate::types::Reading;

/// Tuning for a [`HeartRateMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Assembly buffer capacity in bytes.
    pub buffer_capacity: usize,
    pub resync_mode: ResyncMode,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            resync_mode: ResyncMode::ChunkStart,
        }
    }
}

/// Decodes a Wearlink byte stream and publishes one event per frame.
///
/// The monitor keeps the most recent reading so callers can poll instead of
/// subscribing. It does no locking of its own; share it behind a mutex if
/// chunks arrive on more than one thread.
///
/// ```
/// use hrm_protocol::{Frame, HeartRateMonitor};
///
/// let mut monitor = HeartRateMonitor::new();
/// monitor.subscribe(|event| println!("{}", event.reading));
///
/// // A lone frame stays buffered until the next byte arrives
/// monitor.ingest(Frame::new(0, 0xF1, 72, 0x0364).as_bytes());
/// assert_eq!(monitor.heart_rate(), None);
///
/// monitor.ingest(&[0x00]);
/// assert_eq!(monitor.heart_rate(), Some(72));
/// assert_eq!(monitor.battery_level(), 15);
/// ```
#[derive(Debug, Default)]
pub struct HeartRateMonitor {
    assembler: FrameAssembler,
    dispatcher: EventDispatcher,
    current: Reading,
}

impl HeartRateMonitor {
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        HeartRateMonitor {
            assembler: FrameAssembler::with_options(config.buffer_capacity, config.resync_mode),
            dispatcher: EventDispatcher::new(),
            current: Reading::default(),
        }
    }

    /// Feed a received chunk. Each completed frame updates the current
    /// reading and is then published to every listener.
    ///
    /// Returns the number of readings published.
    pub fn ingest(&mut self, chunk: &[u8]) -> usize {
        let HeartRateMonitor {
            assembler,
            dispatcher,
            current,
        } = self;
        assembler.ingest(chunk, |reading| {
            *current = reading;
            dispatcher.notify(&HrmEvent::heart_rate(reading));
        })
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&HrmEvent) + Send + 'static,
    {
        self.dispatcher.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// The last decoded reading, or the default one before any frame.
    pub fn current_reading(&self) -> Reading {
        self.current
    }

    /// Last heart rate, `None` until the first frame is decoded.
    pub fn heart_rate(&self) -> Option<u8> {
        self.current.heart_rate
    }

    /// Last heart rate, or [`NO_HEART_RATE`](crate::NO_HEART_RATE).
    pub fn heart_rate_or_sentinel(&self) -> i32 {
        self.current.heart_rate_or_sentinel()
    }

    pub fn battery_level(&self) -> u8 {
        self.current.battery_level
    }

    pub fn status(&self) -> u8 {
        self.current.status
    }

    pub fn stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }

    pub fn buffered_len(&self) -> usize {
        self.assembler.buffered_len()
    }

    /// Drop partial frame data, e.g. after the link was re-established.
    pub fn reset_stream(&mut self) {
        self.assembler.reset();
    }
}

impl DataListener for HeartRateMonitor {
    fn on_data(&mut self, data: &[u8]) {
        self.ingest(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::Frame;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_initial_state() {
        let monitor = HeartRateMonitor::new();
        assert_eq!(monitor.heart_rate(), None);
        assert_eq!(monitor.heart_rate_or_sentinel(), NO_HEART_RATE);
        assert_eq!(monitor.battery_level(), DEFAULT_BATTERY_LEVEL);
        assert_eq!(monitor.status(), DEFAULT_STATUS);
        assert_eq!(monitor.current_reading(), Reading::default());
    }

    #[test]
    fn test_current_reading_follows_frames() {
        let mut monitor = HeartRateMonitor::new();
        let mut stream = Vec::new();
        stream.extend_from_slice(Frame::new(1, 0xF1, 70, 0).as_bytes());
        stream.extend_from_slice(Frame::new(2, 0x30, 75, 0).as_bytes());
        stream.push(0x00);

        assert_eq!(monitor.ingest(&stream), 2);
        assert_eq!(monitor.heart_rate(), Some(75));
        assert_eq!(monitor.battery_level(), 3);
        assert_eq!(monitor.status(), 0x30);
        assert_eq!(monitor.stats().frames_decoded, 2);
    }

    #[test]
    fn test_current_reading_updated_before_listeners() {
        let mut monitor = HeartRateMonitor::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        monitor.subscribe(move |event| sink.lock().unwrap().push(event.reading));

        monitor.ingest(Frame::new(3, 0xA1, 88, 0).as_bytes());
        assert!(seen.lock().unwrap().is_empty());

        monitor.ingest(&[0x55]);
        assert_eq!(*seen.lock().unwrap(), vec![monitor.current_reading()]);
        assert_eq!(monitor.heart_rate(), Some(88));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut monitor = HeartRateMonitor::new();
        let count = Arc::new(Mutex::new(0usize));

        let counter = count.clone();
        let id = monitor.subscribe(move |_| *counter.lock().unwrap() += 1);

        let mut stream = Frame::new(0, 0x10, 60, 0).as_bytes().to_vec();
        stream.push(0x00);
        monitor.ingest(&stream);
        assert!(monitor.unsubscribe(id));
        monitor.ingest(&stream);

        assert_eq!(*count.lock().unwrap(), 1);
        // Readings are still tracked without listeners
        assert_eq!(monitor.stats().frames_decoded, 2);
    }

    #[test]
    fn test_data_listener_impl() {
        fn feed(listener: &mut dyn DataListener, data: &[u8]) {
            listener.on_data(data);
        }

        let mut monitor = HeartRateMonitor::new();
        let mut stream = Frame::new(0, 0x80, 101, 0).as_bytes().to_vec();
        stream.push(0xFE);
        feed(&mut monitor, &stream);
        assert_eq!(monitor.heart_rate(), Some(101));
        assert_eq!(monitor.buffered_len(), 1);
    }

    #[test]
    fn test_scan_buffer_config() {
        let mut monitor = HeartRateMonitor::with_config(MonitorConfig {
            resync_mode: ResyncMode::ScanBuffer,
            ..MonitorConfig::default()
        });
        let mut stream = vec![0x01, 0x02];
        stream.extend_from_slice(Frame::new(0, 0x90, 64, 0).as_bytes());
        stream.push(0xFE);

        assert_eq!(monitor.ingest(&stream), 1);
        assert_eq!(monitor.heart_rate(), Some(64));
    }

    #[test]
    fn test_reset_stream_keeps_reading() {
        let mut monitor = HeartRateMonitor::new();
        let mut stream = Frame::new(0, 0x90, 64, 0).as_bytes().to_vec();
        stream.extend_from_slice(&[0x01, 0x02]);
        monitor.ingest(&stream);

        monitor.reset_stream();
        assert_eq!(monitor.buffered_len(), 0);
        assert_eq!(monitor.heart_rate(), Some(64));
    }
}
