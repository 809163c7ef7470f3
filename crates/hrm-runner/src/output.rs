//! Formatting of readings for stdout.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use hrm_protocol::{HrmEvent, Reading};
use serde::Serialize;
use tracing::warn;

use crate::config::RunnerError;

/// How readings are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per reading
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// A reading as emitted in JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRecord<'a> {
    pub timestamp: String,
    pub device: &'a str,
    #[serde(flatten)]
    pub reading: Reading,
}

/// Render one reading.
pub fn format_reading(
    format: OutputFormat,
    device: &str,
    reading: &Reading,
    at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    match format {
        OutputFormat::Text => Ok(format!("{}  {}  {}", timestamp, device, reading)),
        OutputFormat::Json => serde_json::to_string(&ReadingRecord {
            timestamp,
            device,
            reading: *reading,
        }),
    }
}

/// Counts printed readings against an optional limit.
///
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct ReadingLimit {
    count: Arc<AtomicUsize>,
    max: Option<usize>,
}

impl ReadingLimit {
    pub fn new(max: Option<usize>) -> Self {
        ReadingLimit {
            count: Arc::new(AtomicUsize::new(0)),
            max,
        }
    }

    /// Claim one reading. Returns `false` once the limit is reached.
    pub fn try_take(&self) -> bool {
        match self.max {
            None => {
                self.count.fetch_add(1, Ordering::Relaxed);
                true
            }
            Some(max) => self
                .count
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| (n < max).then_some(n + 1))
                .is_ok(),
        }
    }

    /// Readings claimed so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn is_reached(&self) -> bool {
        self.max.is_some_and(|max| self.count() >= max)
    }
}

fn write_reading<W: Write>(
    out: &mut W,
    format: OutputFormat,
    device: &str,
    reading: &Reading,
) -> Result<(), RunnerError> {
    let line = format_reading(format, device, reading, Utc::now())?;
    writeln!(out, "{}", line)?;
    Ok(())
}

/// A monitor listener that writes one line per reading to `out`.
///
/// Readings past the limit are dropped, even when they were decoded from the
/// same chunk as the last accepted one.
pub fn reading_printer<W>(
    format: OutputFormat,
    device: String,
    limit: ReadingLimit,
    mut out: W,
) -> impl FnMut(&HrmEvent) + Send + 'static
where
    W: Write + Send + 'static,
{
    move |event| {
        if !limit.try_take() {
            return;
        }
        if let Err(e) = write_reading(&mut out, format, &device, &event.reading) {
            warn!("failed to print reading: {}", e);
        }
    }
}
