//! Telemetry receiver.
//!
//! Two tasks share one socket. The ping loop keeps this endpoint registered
//! with the server; the frame loop decodes whatever arrives and publishes it
//! on a single-slot `watch` channel, so readers always see the newest frame
//! and never a backlog.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use xrhand_net::{HEARTBEAT, TelemetryFrame};

use crate::error::ReceiverError;

/// Matches the server's heartbeat expectations with a comfortable margin.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_millis(500);

/// Room for one packet plus slack; anything larger is not ours anyway.
const RECV_BUFFER_SIZE: usize = 8192;

/// Where to reach the server and how to present ourselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// The telemetry server's heartbeat port.
    pub server: SocketAddr,
    /// Local address to bind. Port `0` picks an ephemeral port.
    pub bind_addr: SocketAddr,
    /// Time between heartbeats.
    pub ping_interval: Duration,
}

impl ReceiverConfig {
    #[must_use]
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            ping_interval: DEFAULT_PING_INTERVAL,
        }
    }

    /// Override the local bind address.
    #[must_use]
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Override the heartbeat interval.
    #[must_use]
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }
}

/// A running receiver.
#[derive(Debug)]
pub struct TelemetryReceiver {
    local_addr: SocketAddr,
    frames: watch::Receiver<Option<TelemetryFrame>>,
    shutdown: watch::Sender<bool>,
    pinger: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl TelemetryReceiver {
    /// Bind the socket and start pinging `config.server`.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::PingInterval`] for a zero interval and
    /// [`ReceiverError::Bind`] if the socket cannot be bound.
    pub async fn start(config: ReceiverConfig) -> Result<Self, ReceiverError> {
        if config.ping_interval.is_zero() {
            return Err(ReceiverError::PingInterval);
        }

        let addr = config.bind_addr;
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ReceiverError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| ReceiverError::Bind { addr, source })?;
        let socket = Arc::new(socket);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let (frames_tx, frames) = watch::channel(None);

        info!(%local_addr, server = %config.server, "telemetry receiver started");

        let pinger = tokio::spawn(ping_loop(
            Arc::clone(&socket),
            config.server,
            config.ping_interval,
            shutdown_rx.clone(),
        ));
        let reader = tokio::spawn(frame_loop(socket, frames_tx, shutdown_rx));

        Ok(Self {
            local_addr,
            frames,
            shutdown,
            pinger,
            reader,
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A handle that is notified whenever a newer frame lands.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<TelemetryFrame>> {
        self.frames.clone()
    }

    /// The most recent frame, if any has arrived yet.
    #[must_use]
    pub fn latest(&self) -> Option<TelemetryFrame> {
        self.frames.borrow().clone()
    }

    /// Stop both loops and close the socket.
    pub async fn stop(self) {
        self.shutdown.send_replace(true);
        for (name, task) in [("ping", self.pinger), ("frame", self.reader)] {
            if let Err(err) = task.await {
                error!(task = name, %err, "receiver task ended abnormally");
            }
        }
        info!(local_addr = %self.local_addr, "telemetry receiver stopped");
    }
}

/// Decode `payload` and publish it as the latest frame.
///
/// Returns `false` (and publishes nothing) for anything that is not a valid
/// packet.
pub fn publish_datagram(
    frames: &watch::Sender<Option<TelemetryFrame>>,
    payload: &[u8],
    from: SocketAddr,
) -> bool {
    match TelemetryFrame::decode(payload) {
        Ok(frame) => {
            frames.send_replace(Some(frame));
            true
        }
        Err(err) => {
            debug!(%from, len = payload.len(), %err, "dropping datagram");
            false
        }
    }
}

async fn ping_loop(
    socket: Arc<UdpSocket>,
    server: SocketAddr,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                if let Err(err) = socket.send_to(HEARTBEAT, server).await {
                    warn!(%server, %err, "heartbeat send failed");
                }
            }
        }
    }

    debug!("ping loop stopped");
}

async fn frame_loop(
    socket: Arc<UdpSocket>,
    frames: watch::Sender<Option<TelemetryFrame>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let mut received: u64 = 0;

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok((len, from)) => {
                    if publish_datagram(&frames, &buf[..len], from) {
                        received += 1;
                    }
                }
                // ICMP port-unreachable from a server that is not up yet
                // surfaces here on some platforms.
                Err(err) => debug!(%err, "receive failed"),
            },
        }
    }

    debug!(frames = received, "frame loop stopped");
}
