use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use lan_watch_rs::config::{parse_host_range, EventFormat, MonitorConfig, NetworkPrefix, OutputMode};
use lan_watch_rs::scheduler::Monitor;
use lan_watch_rs::{netdetect, output, ports};

/// lan-watch-rs — continuous TCP reachability monitor for a /24 subnet.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lan-watch-rs",
    version,
    about = "Continuously probes a /24 subnet and reports open or changed TCP endpoints.",
    long_about = None
)]
struct Cli {
    /// Network prefix (`192.168.1`) or /24 CIDR. If omitted, auto-detect the local /24.
    #[arg(long, env = "LAN_WATCH_NETWORK")]
    network: Option<String>,

    /// Inclusive host index range inside the prefix.
    #[arg(long, env = "LAN_WATCH_HOSTS", default_value = "1-254")]
    hosts: String,

    /// Comma-separated ports and ranges, e.g. `80,443,8000-8010`.
    #[arg(long, env = "LAN_WATCH_PORTS", default_value = "80,443,445,8000,8800")]
    ports: String,

    /// Read ports from a file instead (one port or range per line, `#` comments).
    #[arg(long = "ports-file", env = "LAN_WATCH_PORTS_FILE")]
    ports_file: Option<PathBuf>,

    /// Per-probe connect timeout in milliseconds.
    #[arg(long = "timeout-ms", env = "LAN_WATCH_TIMEOUT_MS", default_value_t = 1000)]
    timeout_ms: u64,

    /// Max concurrent TCP connect attempts.
    #[arg(long, env = "LAN_WATCH_CONCURRENCY", default_value_t = 500)]
    concurrency: usize,

    /// Seconds to sleep between cycles.
    #[arg(long = "interval-secs", env = "LAN_WATCH_INTERVAL_SECS", default_value_t = 30)]
    interval_secs: u64,

    /// Report only endpoints whose state changed since the previous cycle.
    #[arg(long = "changes-only", env = "LAN_WATCH_CHANGES_ONLY", default_value_t = false)]
    changes_only: bool,

    /// Event line format on stdout.
    #[arg(long, env = "LAN_WATCH_FORMAT", value_enum, default_value_t = EventFormat::Text)]
    format: EventFormat,

    /// Stop after this many cycles.
    #[arg(long, env = "LAN_WATCH_CYCLES", value_parser = clap::value_parser!(u64).range(1..))]
    cycles: Option<u64>,

    /// Run a single cycle and exit.
    #[arg(long, conflicts_with = "cycles")]
    once: bool,

    /// Emit logs as JSON on stderr.
    #[arg(long = "log-json", env = "LAN_WATCH_LOG_JSON", default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Arc::new(build_config(&cli)?);

    let (tx, rx) = mpsc::channel(1024);
    let printer = output::spawn_printer(rx, config.format, io::stdout());

    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_ctrlc.cancel();
        }
    });

    let summary = Monitor::new(config, tx).run(cancel).await;

    // The monitor owned the only sender, so the printer drains and exits.
    let lines = printer.await.context("printer task failed")??;
    tracing::info!(cycles = summary.cycles, lines, "monitor stopped");

    if summary.cancelled {
        println!("Interrupted, exiting.");
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_config(cli: &Cli) -> Result<MonitorConfig> {
    let network = match cli.network.as_deref() {
        Some(raw) => raw.parse::<NetworkPrefix>()?,
        None => match netdetect::detect_local_prefix() {
            Some(prefix) => {
                tracing::info!(network = %prefix, "auto-detected local network");
                prefix
            }
            None => {
                let fallback = NetworkPrefix::default();
                tracing::warn!(network = %fallback, "no local IPv4 network found, using default");
                fallback
            }
        },
    };

    let (host_start, host_end) = parse_host_range(&cli.hosts)?;

    let port_list = match cli.ports_file.as_deref() {
        Some(path) => ports::load_ports_from_path(path)?,
        None => ports::parse_ports_str(&cli.ports)?,
    };

    let config = MonitorConfig {
        network,
        host_start,
        host_end,
        ports: port_list,
        timeout: Duration::from_millis(cli.timeout_ms),
        max_concurrency: cli.concurrency,
        interval: Duration::from_secs(cli.interval_secs),
        mode: if cli.changes_only {
            OutputMode::ChangeOnly
        } else {
            OutputMode::AllOpen
        },
        format: cli.format,
        max_cycles: if cli.once { Some(1) } else { cli.cycles },
    };
    config.validate()?;
    Ok(config)
}
