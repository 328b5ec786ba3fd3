//! Server error types.

use std::net::SocketAddr;

/// A configuration value that cannot be used. Always fatal at startup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("tick rate must be a positive, finite number of Hz (got {0})")]
    TickRate(f64),

    #[error("client timeout must be a positive, finite number of seconds (got {0})")]
    ClientTimeout(f64),

    #[error("reaper interval must be greater than zero")]
    ReapInterval,
}

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
