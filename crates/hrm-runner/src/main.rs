//! `hrmlink` - stream heart-rate readings from a Polar Bluetooth monitor.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use hrm_metrics::{describe_metrics, MetricLabels};
use hrm_protocol::{HeartRateMonitor, LoggingReadyStateListener, ResyncMode};
use hrm_runner::config::{LinkAddress, RunnerConfig, RunnerError};
use hrm_runner::connection::LinkClient;
use hrm_runner::devices::resolve_target_reporting;
use hrm_runner::output::{reading_printer, OutputFormat, ReadingLimit};
use hrm_runner::telemetry::{init_logging, MonitorMetrics};
use tracing::{error, info};

/// Stream heart-rate readings from a Polar Bluetooth monitor
#[derive(Parser, Debug)]
#[command(name = "hrmlink")]
#[command(about = "Stream heart-rate readings from a Polar Bluetooth monitor", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Paired device name to connect to
    #[arg(short, long)]
    device: Option<String>,

    /// Read from a device node or capture file instead of a paired device
    #[arg(long, conflicts_with_all = ["tcp", "device"])]
    file: Option<PathBuf>,

    /// Read from a TCP bridge (host:port) instead of a paired device
    #[arg(long, conflicts_with = "device")]
    tcp: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Connection attempts before giving up
    #[arg(long)]
    retries: Option<u32>,

    /// Pause between connection attempts, in milliseconds
    #[arg(long)]
    retry_interval_ms: Option<u64>,

    /// Where the header byte is trusted for resynchronization
    #[arg(long, value_enum)]
    resync: Option<ResyncArg>,

    /// Stop after this many readings
    #[arg(short = 'n', long)]
    max_readings: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResyncArg {
    /// Only a header byte at the start of a read
    ChunkStart,
    /// Any header byte in the buffer
    ScanBuffer,
}

impl From<ResyncArg> for ResyncMode {
    fn from(arg: ResyncArg) -> Self {
        match arg {
            ResyncArg::ChunkStart => ResyncMode::ChunkStart,
            ResyncArg::ScanBuffer => ResyncMode::ScanBuffer,
        }
    }
}

impl Cli {
    fn direct_link(&self) -> Option<LinkAddress> {
        if let Some(path) = &self.file {
            return Some(LinkAddress::File { path: path.clone() });
        }
        self.tcp.as_ref().map(|address| LinkAddress::Tcp { address: address.clone() })
    }

    fn load_config(&self) -> Result<RunnerConfig, RunnerError> {
        let mut config = match &self.config {
            Some(path) => RunnerConfig::load(path)?,
            None => RunnerConfig::default(),
        };
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(interval) = self.retry_interval_ms {
            config.retry_interval_ms = interval;
        }
        if let Some(resync) = self.resync {
            config.monitor.resync_mode = resync.into();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), RunnerError> {
    let config = cli.load_config()?;
    let mut ready = LoggingReadyStateListener;
    let device = resolve_target_reporting(cli.direct_link(), cli.device.as_deref(), &config, &mut ready)?;
    info!(
        "device {} via {} (resync {}, buffer {} bytes)",
        device.name, device.link, config.monitor.resync_mode, config.monitor.buffer_capacity
    );

    describe_metrics();
    let labels = MetricLabels::new(&device.name, device.link.kind());
    let mut monitor_metrics = MonitorMetrics::new(&labels);

    let mut monitor = HeartRateMonitor::with_config(config.monitor);
    let limit = ReadingLimit::new(cli.max_readings);
    monitor.subscribe(reading_printer(
        cli.format,
        device.name.clone(),
        limit.clone(),
        std::io::stdout(),
    ));

    let client = LinkClient::from_config(device, &config);
    let mut stream = client.connect(&mut ready).await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            chunk = stream.next_chunk() => {
                let Some(data) = chunk? else {
                    info!("link closed");
                    break;
                };
                monitor.ingest(data);
                monitor_metrics.record(&monitor);

                if limit.is_reached() {
                    info!("reached {} readings", limit.count());
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }
    }

    let stats = monitor.stats();
    info!(
        "received {} bytes, decoded {} frames, {} resyncs ({} bytes discarded), last reading: {}",
        stream.bytes_received(),
        stats.frames_decoded,
        stats.resyncs,
        stats.bytes_discarded,
        monitor.current_reading()
    );
    Ok(())
}
