//! Receiver error types.

use std::net::SocketAddr;

/// Errors that stop the receiver from starting.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("ping interval must be greater than zero")]
    PingInterval,

    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
