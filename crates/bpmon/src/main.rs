//! Unattended monitor for a BLE blood pressure meter.
//!
//! Runs until interrupted: scans for the meter, connects when it appears,
//! prints each measurement, and starts over from a fresh scan after any
//! failure.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bpmon_core::{BleTransport, ConsoleReporter, MonitorConfig, Supervisor};

#[derive(Parser)]
#[command(name = "bpmon")]
#[command(author, version, about = "Monitor a BLE blood pressure meter", long_about = None)]
struct Cli {
    /// Advertised device name to monitor (defaults to the known meter)
    #[arg(short, long)]
    device: Option<String>,

    /// Scan pass duration in seconds
    #[arg(long, default_value = "5")]
    scan_duration: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value = "15")]
    connect_timeout: u64,

    /// Delay before retrying after a failure, in seconds
    #[arg(long, default_value = "5")]
    retry_delay: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = MonitorConfig::default()
        .scan_duration(Duration::from_secs(cli.scan_duration))
        .connect_timeout(Duration::from_secs(cli.connect_timeout))
        .retry_delay(Duration::from_secs(cli.retry_delay));
    if let Some(device) = cli.device {
        config = config.device_name(device);
    }
    config.validate()?;

    let transport = BleTransport::new().await?;
    let supervisor = Supervisor::new(transport, config, Arc::new(ConsoleReporter::new()));

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    supervisor.run(cancel).await;
    Ok(())
}
