//! Server events and where they go.
//!
//! The server never decides how a host wants to hear about client churn or
//! transport trouble. It emits [`ServerEvent`]s into an [`EventSink`]; the
//! default sink logs them through `tracing`.

use std::net::SocketAddr;

use tokio::sync::mpsc;
use tracing::{info, warn};

/// Something a host may want to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// First heartbeat from an endpoint not currently registered.
    ClientRegistered(SocketAddr),
    /// The reaper evicted an endpoint that stopped sending heartbeats.
    ClientTimedOut(SocketAddr),
    /// Receiving a datagram failed. The listener keeps going.
    ReceiveError(String),
    /// Sending telemetry to one endpoint failed. The endpoint stays registered.
    SendError { endpoint: SocketAddr, message: String },
}

/// Receiver of [`ServerEvent`]s. Called from the server's tasks, so
/// implementations must not block.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: ServerEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ServerEvent) {
        match event {
            ServerEvent::ClientRegistered(endpoint) => {
                info!(%endpoint, "client registered");
            }
            ServerEvent::ClientTimedOut(endpoint) => {
                info!(%endpoint, "client timed out");
            }
            ServerEvent::ReceiveError(message) => {
                warn!(error = %message, "receive failed");
            }
            ServerEvent::SendError { endpoint, message } => {
                warn!(%endpoint, error = %message, "send failed");
            }
        }
    }
}

/// Forwards events to an unbounded channel, for hosts that consume them
/// asynchronously. Events emitted after the receiver is dropped are lost.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ServerEvent) {
        // A closed receiver means the host stopped listening.
        let _ = self.tx.send(event);
    }
}
