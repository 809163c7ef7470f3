//! # hrm-runner
//!
//! Runs a Polar Bluetooth heart-rate monitor from the command line.
//!
//! The runner resolves a paired device, opens its link with retries, feeds
//! the received bytes into a [`hrm_protocol::HeartRateMonitor`] and prints
//! every reading. The `hrmlink` binary is a thin wrapper around these modules.
//!
//! ## Example
//!
//! ```no_run
//! use hrm_protocol::{HeartRateMonitor, LoggingReadyStateListener};
//! use hrm_runner::config::{LinkAddress, RunnerConfig};
//! use hrm_runner::connection::LinkClient;
//! use hrm_runner::devices::ad_hoc_device;
//!
//! # async fn run() -> Result<(), hrm_runner::config::RunnerError> {
//! let device = ad_hoc_device(LinkAddress::File { path: "/dev/rfcomm0".into() });
//! let client = LinkClient::from_config(device, &RunnerConfig::default());
//!
//! let mut monitor = HeartRateMonitor::new();
//! monitor.subscribe(|event| println!("{}", event.reading));
//!
//! let mut stream = client.connect(&mut LoggingReadyStateListener).await?;
//! stream.pump(&mut monitor).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod devices;
pub mod output;
pub mod telemetry;
