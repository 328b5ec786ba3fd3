use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xrhand_server::config::{DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_TICK_RATE};
use xrhand_server::{LogSink, ServerConfig, SyntheticPose, TelemetryServer};

#[derive(Parser)]
#[command(
    name = "xrhand_server",
    about = "Broadcast hand tracking telemetry to heartbeat-registered UDP clients"
)]
struct Args {
    /// UDP port for heartbeats in and telemetry out
    #[arg(
        short,
        long,
        env = "XRHAND_PORT",
        default_value_t = DEFAULT_PORT,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    port: u16,

    /// Seconds without a heartbeat before a client is dropped
    #[arg(short, long, env = "XRHAND_TIMEOUT_SECS", default_value_t = DEFAULT_CLIENT_TIMEOUT_SECS)]
    timeout_secs: f64,

    /// Broadcast rate in Hz
    #[arg(short = 'r', long, env = "XRHAND_TICK_RATE", default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: f64,

    /// Milliseconds between reaper sweeps
    #[arg(long, default_value_t = 100)]
    reap_interval_ms: u64,

    /// Local address to bind
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = ServerConfig::default()
        .with_bind_addr(args.bind)
        .with_port(args.port)
        .with_client_timeout_secs(args.timeout_secs)
        .with_tick_rate(args.tick_rate)
        .with_reap_interval(Duration::from_millis(args.reap_interval_ms));

    // No headset binding here: serve the animated stand-in.
    let server =
        TelemetryServer::start(config, Arc::new(SyntheticPose::new()), Arc::new(LogSink)).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");

    server.stop().await;
    Ok(())
}
