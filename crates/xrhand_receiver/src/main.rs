use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xrhand_math::HandSide;
use xrhand_receiver::{ReceiverConfig, TelemetryReceiver};

#[derive(Parser)]
#[command(
    name = "xrhand_receiver",
    about = "Subscribe to a hand tracking telemetry server and print what arrives"
)]
struct Args {
    /// Server heartbeat address
    #[arg(short, long, env = "XRHAND_SERVER", default_value = "127.0.0.1:9001")]
    server: SocketAddr,

    /// Local address to bind
    #[arg(short, long, default_value = "0.0.0.0:0")]
    bind: SocketAddr,

    /// Milliseconds between heartbeats
    #[arg(long, default_value_t = 500)]
    ping_interval_ms: u64,

    /// Print every frame as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = ReceiverConfig::new(args.server)
        .with_bind_addr(args.bind)
        .with_ping_interval(Duration::from_millis(args.ping_interval_ms));
    let receiver = TelemetryReceiver::start(config).await?;
    let mut frames = receiver.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(frame) = frames.borrow_and_update().clone() else {
                    continue;
                };
                if args.json {
                    println!("{}", serde_json::to_string(&frame)?);
                } else {
                    // RH56F1 targets, normalised, for whichever hands are tracked.
                    let [left, right] = HandSide::ALL.map(|side| {
                        let hand = frame.hand(side);
                        hand.is_tracked().then(|| hand.rh56f1_angles(side).normalized)
                    });
                    info!(
                        timestamp = frame.timestamp,
                        ?left,
                        ?right,
                        head = ?frame.head.to_robot_frame().position,
                        "frame"
                    );
                }
            }
        }
    }

    receiver.stop().await;
    Ok(())
}
