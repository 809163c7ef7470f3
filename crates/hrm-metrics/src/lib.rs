//! Metrics infrastructure for the heart-rate monitor link.
//!
//! This crate describes every metric the link and decoder emit. It re-exports
//! the `metrics` crate and declares each metric as a structured [`Metric`]
//! constant so names, units and label keys live in one place.
//!
//! # Example
//!
//! ```rust,ignore
//! use hrm_metrics::{MetricLabels, metric_defs, describe_metrics};
//!
//! // Initialize metrics descriptions at startup
//! describe_metrics();
//!
//! let labels = MetricLabels::new("Polar iWL", "file");
//! metrics::counter!(metric_defs::FRAMES_DECODED.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use hrm_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const RESYNCS: Metric = Metric::counter("hrm.frames.resyncs")
///     .with_description("Resyncs performed")
///     .with_unit(Unit::Count)
///     .with_labels(&["device"]);
///
/// assert_eq!(RESYNCS.name, "hrm.frames.resyncs");
/// assert_eq!(RESYNCS.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "hrm.frames.decoded").
    pub name: &'static str,
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn with_kind(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Counter)
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Gauge)
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Histogram)
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    ///
    /// This should be called once at startup for each metric.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the link and decoder.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Labels present on every metric.
    pub const STANDARD_LABELS: &[&str] = &["device", "link"];

    // ========================================================================
    // Link Metrics
    // ========================================================================

    /// Raw bytes received from the link.
    pub const BYTES_RECEIVED: Metric = Metric::counter("hrm.link.bytes_received")
        .with_description("Raw bytes received from the link")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Chunks delivered by the link.
    pub const CHUNKS_RECEIVED: Metric = Metric::counter("hrm.link.chunks_received")
        .with_description("Chunks delivered by the link")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Connection attempts, successful or not.
    pub const CONNECT_ATTEMPTS: Metric = Metric::counter("hrm.link.connect_attempts")
        .with_description("Connection attempts made")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Size of each received chunk.
    pub const CHUNK_SIZE: Metric = Metric::histogram("hrm.link.chunk_size_bytes")
        .with_description("Size of each received chunk")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    // ========================================================================
    // Framing Metrics
    // ========================================================================

    /// Frames cut from the stream and decoded.
    pub const FRAMES_DECODED: Metric = Metric::counter("hrm.frames.decoded")
        .with_description("Frames extracted and decoded")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Resyncs on a header byte.
    pub const RESYNCS: Metric = Metric::counter("hrm.frames.resyncs")
        .with_description("Resyncs performed by the frame assembler")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Buffered bytes dropped by resyncs.
    pub const BYTES_DISCARDED: Metric = Metric::counter("hrm.frames.bytes_discarded")
        .with_description("Buffered bytes dropped by resyncs")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    // ========================================================================
    // Reading Metrics
    // ========================================================================

    /// Last decoded heart rate in beats per minute.
    pub const HEART_RATE: Metric = Metric::gauge("hrm.reading.heart_rate_bpm")
        .with_description("Last decoded heart rate in beats per minute")
        .with_labels(STANDARD_LABELS);

    /// Last decoded battery level, 0 to 15.
    pub const BATTERY_LEVEL: Metric = Metric::gauge("hrm.reading.battery_level")
        .with_description("Last decoded battery level (0-15)")
        .with_labels(STANDARD_LABELS);

    /// All metrics, for bulk description at startup.
    pub const ALL: &[&Metric] = &[
        &BYTES_RECEIVED,
        &CHUNKS_RECEIVED,
        &CONNECT_ATTEMPTS,
        &CHUNK_SIZE,
        &FRAMES_DECODED,
        &RESYNCS,
        &BYTES_DISCARDED,
        &HEART_RATE,
        &BATTERY_LEVEL,
    ];
}

/// Labels identifying which monitor a metric belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLabels {
    /// Paired device name.
    pub device: String,
    /// Link kind ("file", "tcp").
    pub link: String,
}

impl MetricLabels {
    /// ```rust
    /// use hrm_metrics::MetricLabels;
    ///
    /// let labels = MetricLabels::new("Polar iWL", "file");
    /// assert_eq!(labels.device, "Polar iWL");
    /// ```
    pub fn new(device: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            link: link.into(),
        }
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![("device", self.device.clone()), ("link", self.link.clone())]
    }
}

/// Registers descriptions for every metric in [`metric_defs::ALL`].
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
