//! streamwatchd — the streamwatch daemon.
//!
//! Polls the configured streaming devices, re-applies their stream
//! configuration, and exports device gauges for Prometheus.
//!
//! # Usage
//!
//! ```text
//! streamwatchd run --config /etc/streamwatch/streamwatch.toml
//! streamwatchd check --config streamwatch.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use streamwatch_core::MonitorConfig;

#[derive(Parser)]
#[command(name = "streamwatchd", about = "Streaming device monitor", version)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Monitor devices and serve /metrics until interrupted.
    Run {
        /// Path to the configuration file.
        #[arg(long, default_value = "streamwatch.toml")]
        config: PathBuf,

        /// Exporter listen address (overrides `metrics.listen`).
        #[arg(long)]
        listen: Option<String>,
    },
    /// Validate the configuration and print the device roster.
    Check {
        /// Path to the configuration file.
        #[arg(long, default_value = "streamwatch.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Run { config, listen } => {
            let config = MonitorConfig::from_file(&config)?;
            streamwatchd::run(config, listen).await
        }
        Command::Check { config } => {
            let parsed = MonitorConfig::from_file(&config)?;
            println!("{}: {} device(s)", config.display(), parsed.devices.len());
            for line in streamwatchd::summarize(&parsed) {
                println!("  {line}");
            }
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,streamwatchd=debug,streamwatch_monitor=debug")
    });

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}
