//! Runner configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags. Everything has a default, so an empty file is valid.
//!
//! ```yaml
//! device: "Polar iWL"
//! retries: 3
//! retry_interval_ms: 3000
//! read_chunk_size: 64
//! buffer_capacity: 32
//! resync_mode: chunk-start
//! paired_devices:
//!   - name: "Polar iWL"
//!     link: { kind: file, path: "/dev/rfcomm0" }
//!   - name: "bridge"
//!     link: { kind: tcp, address: "127.0.0.1:9000" }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use hrm_protocol::{HrmError, MonitorConfig, MIN_BUFFER_CAPACITY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection attempts made before giving up.
pub const DEFAULT_NUM_RETRIES: u32 = 3;
/// Pause between connection attempts.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 3000;
/// Largest chunk requested from the link per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64;

/// Errors raised by the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Link(#[from] HrmError),
}

/// Where a paired device's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkAddress {
    /// A bound RFCOMM device node or a recorded capture file.
    File { path: PathBuf },
    /// A TCP bridge forwarding the serial stream.
    Tcp { address: String },
}

impl LinkAddress {
    /// Short name used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            LinkAddress::File { .. } => "file",
            LinkAddress::Tcp { .. } => "tcp",
        }
    }
}

impl std::fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkAddress::File { path } => write!(f, "file:{}", path.display()),
            LinkAddress::Tcp { address } => write!(f, "tcp:{}", address),
        }
    }
}

/// A device known by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedDevice {
    pub name: String,
    pub link: LinkAddress,
}

/// Complete runner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Name of the paired device to connect to.
    pub device: Option<String>,
    /// Connection attempts before giving up.
    pub retries: u32,
    pub retry_interval_ms: u64,
    /// Largest chunk read from the link at once.
    pub read_chunk_size: usize,
    #[serde(flatten)]
    pub monitor: MonitorConfig,
    pub paired_devices: Vec<PairedDevice>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            device: None,
            retries: DEFAULT_NUM_RETRIES,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            monitor: MonitorConfig::default(),
            paired_devices: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|source| RunnerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Reject values the link or the assembler cannot work with.
    pub fn validate(&self) -> Result<(), HrmError> {
        if self.retries == 0 {
            return Err(HrmError::InvalidConfig("retries must be at least 1".to_string()));
        }
        if self.read_chunk_size == 0 {
            return Err(HrmError::InvalidConfig("read_chunk_size must be positive".to_string()));
        }
        if self.monitor.buffer_capacity < MIN_BUFFER_CAPACITY {
            return Err(HrmError::InvalidConfig(format!(
                "buffer_capacity must be at least {} bytes, got {}",
                MIN_BUFFER_CAPACITY, self.monitor.buffer_capacity
            )));
        }
        Ok(())
    }
}
