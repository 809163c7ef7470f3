//! Link client
//!
//! Opens the byte source of a paired device, retrying a fixed number of times
//! with a fixed pause, and hands every received chunk to a [`DataListener`].
//! Lifecycle is reported to a [`ReadyStateListener`].
//!
//! Two kinds of source are supported:
//! - a file path, which covers a bound RFCOMM node such as `/dev/rfcomm0` as
//!   well as recorded captures
//! - a TCP address, for a bridge that forwards the serial stream

use std::io;
use std::time::Duration;

use hrm_metrics::metric_defs;
use hrm_metrics::metrics::{counter, histogram};
use hrm_metrics::MetricLabels;
use hrm_protocol::{DataListener, HrmError, HrmResult, ReadyStateListener};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::{LinkAddress, PairedDevice, RunnerConfig, DEFAULT_READ_CHUNK_SIZE};

type Reader = Box<dyn AsyncRead + Unpin + Send>;

/// Connects to one paired device.
#[derive(Debug, Clone)]
pub struct LinkClient {
    device: PairedDevice,
    retries: u32,
    retry_interval: Duration,
    read_chunk_size: usize,
}

impl LinkClient {
    pub fn new(device: PairedDevice, retries: u32, retry_interval: Duration) -> Self {
        LinkClient {
            device,
            retries,
            retry_interval,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }

    pub fn from_config(device: PairedDevice, config: &RunnerConfig) -> Self {
        Self::new(device, config.retries, config.retry_interval())
            .with_read_chunk_size(config.read_chunk_size)
    }

    /// Set the largest chunk requested per read.
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    pub fn device(&self) -> &PairedDevice {
        &self.device
    }

    /// Open the link, making up to `retries` attempts.
    ///
    /// `ready` hears `on_ready` once the link is open, or `on_error` with
    /// [`HrmError::ConnectionFailed`] after the last failed attempt.
    pub async fn connect<R>(&self, ready: &mut R) -> HrmResult<LinkStream>
    where
        R: ReadyStateListener + ?Sized,
    {
        let labels = MetricLabels::new(&self.device.name, self.device.link.kind()).to_labels();

        for attempt in 1..=self.retries {
            counter!(metric_defs::CONNECT_ATTEMPTS.name, &labels).increment(1);
            match open(&self.device.link).await {
                Ok(reader) => {
                    info!(
                        "connected to {} ({}) on attempt {}",
                        self.device.name, self.device.link, attempt
                    );
                    ready.on_ready(&self.device.name);
                    return Ok(LinkStream {
                        reader,
                        buf: vec![0u8; self.read_chunk_size],
                        labels,
                        bytes_received: 0,
                    });
                }
                Err(e) => {
                    warn!(
                        "connection attempt {}/{} to {} failed: {}",
                        attempt, self.retries, self.device.link, e
                    );
                    if attempt < self.retries {
                        tokio::time::sleep(self.retry_interval).await;
                    }
                }
            }
        }

        let error = HrmError::ConnectionFailed {
            device: self.device.name.clone(),
            attempts: self.retries,
        };
        ready.on_error(&self.device.name, &error);
        Err(error)
    }
}

async fn open(link: &LinkAddress) -> io::Result<Reader> {
    match link {
        LinkAddress::File { path } => {
            let file = tokio::fs::File::open(path).await?;
            Ok(Box::new(file))
        }
        LinkAddress::Tcp { address } => {
            let stream = TcpStream::connect(address.as_str()).await?;
            stream.set_nodelay(true)?;
            Ok(Box::new(stream))
        }
    }
}

/// An open link delivering chunks as they are read.
pub struct LinkStream {
    reader: Reader,
    buf: Vec<u8>,
    labels: Vec<(&'static str, String)>,
    bytes_received: u64,
}

impl LinkStream {
    /// Read the next chunk. Returns `None` once the link is closed.
    ///
    /// Cancel safe: a dropped call loses no bytes.
    pub async fn next_chunk(&mut self) -> HrmResult<Option<&[u8]>> {
        let n = loop {
            match self.reader.read(&mut self.buf).await {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if n == 0 {
            debug!("link closed after {} bytes", self.bytes_received);
            return Ok(None);
        }

        self.bytes_received += n as u64;
        counter!(metric_defs::BYTES_RECEIVED.name, &self.labels).increment(n as u64);
        counter!(metric_defs::CHUNKS_RECEIVED.name, &self.labels).increment(1);
        histogram!(metric_defs::CHUNK_SIZE.name, &self.labels).record(n as f64);

        Ok(Some(&self.buf[..n]))
    }

    /// Deliver every chunk to `listener` until the link closes.
    ///
    /// Returns the total number of bytes received on this link.
    pub async fn pump<L>(&mut self, listener: &mut L) -> HrmResult<u64>
    where
        L: DataListener + ?Sized,
    {
        while let Some(chunk) = self.next_chunk().await? {
            listener.on_data(chunk);
        }
        Ok(self.bytes_received)
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStream")
            .field("read_chunk_size", &self.buf.len())
            .field("bytes_received", &self.bytes_received)
            .finish()
    }
}
