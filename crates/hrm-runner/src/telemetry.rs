//! Logging setup and metric recording for a running monitor.

use hrm_metrics::metric_defs;
use hrm_metrics::metrics::{counter, gauge};
use hrm_metrics::MetricLabels;
use hrm_protocol::{AssemblerStats, HeartRateMonitor};
use tracing_subscriber::EnvFilter;

/// Default log filter for a `-v` count. `RUST_LOG` takes precedence.
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `log` records from the protocol crate are forwarded as well.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .try_init();
    if let Err(e) = result {
        eprintln!("logging already initialized: {}", e);
    }
}

/// Publishes a monitor's counters and last reading as metrics.
#[derive(Debug)]
pub struct MonitorMetrics {
    labels: Vec<(&'static str, String)>,
    last: AssemblerStats,
}

impl MonitorMetrics {
    pub fn new(labels: &MetricLabels) -> Self {
        MonitorMetrics {
            labels: labels.to_labels(),
            last: AssemblerStats::default(),
        }
    }

    /// Record what changed since the previous call.
    pub fn record(&mut self, monitor: &HeartRateMonitor) {
        let stats = monitor.stats();
        let delta = stats_delta(&self.last, &stats);
        self.last = stats;

        if delta.frames_decoded > 0 {
            counter!(metric_defs::FRAMES_DECODED.name, &self.labels).increment(delta.frames_decoded);
        }
        if delta.resyncs > 0 {
            counter!(metric_defs::RESYNCS.name, &self.labels).increment(delta.resyncs);
            counter!(metric_defs::BYTES_DISCARDED.name, &self.labels).increment(delta.bytes_discarded);
        }
        if let Some(bpm) = monitor.heart_rate() {
            gauge!(metric_defs::HEART_RATE.name, &self.labels).set(f64::from(bpm));
            gauge!(metric_defs::BATTERY_LEVEL.name, &self.labels).set(f64::from(monitor.battery_level()));
        }
    }
}

fn stats_delta(before: &AssemblerStats, after: &AssemblerStats) -> AssemblerStats {
    AssemblerStats {
        bytes_ingested: after.bytes_ingested.saturating_sub(before.bytes_ingested),
        frames_decoded: after.frames_decoded.saturating_sub(before.frames_decoded),
        resyncs: after.resyncs.saturating_sub(before.resyncs),
        bytes_discarded: after.bytes_discarded.saturating_sub(before.bytes_discarded),
    }
}
