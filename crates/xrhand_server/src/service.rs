//! Telemetry server: owns the socket and the three schedules.
//!
//! ## Lifecycle
//!
//! 1. Validate the configuration. Nothing is bound if it is invalid.
//! 2. Bind one UDP socket, shared by the listener (receive) and the
//!    broadcast loop (send).
//! 3. Spawn the heartbeat listener, the reaper and the broadcast loop.
//! 4. On [`TelemetryServer::stop`], raise the shutdown signal, wait for the
//!    listener to exit, then the other two, and only then close the socket.
//!
//! Dropping the server without calling `stop` also ends all three tasks,
//! since their shutdown receivers see the sender go away.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::broadcast::BroadcastLoop;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::events::EventSink;
use crate::listener::HeartbeatListener;
use crate::provider::PoseProvider;
use crate::reaper::Reaper;
use crate::registry::ClientRegistry;

/// A running telemetry server.
#[derive(Debug)]
pub struct TelemetryServer {
    local_addr: SocketAddr,
    socket: Arc<UdpSocket>,
    registry: Arc<ClientRegistry>,
    shutdown: watch::Sender<bool>,
    listener: JoinHandle<()>,
    reaper: JoinHandle<()>,
    broadcaster: JoinHandle<()>,
}

impl TelemetryServer {
    /// Validate `config`, bind the socket and start all schedules.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] for an invalid configuration and
    /// [`ServerError::Bind`] if the socket cannot be bound. Either way no
    /// task has been started.
    pub async fn start(
        config: ServerConfig,
        provider: Arc<dyn PoseProvider>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = config.listen_addr();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;
        let socket = Arc::new(socket);
        let registry = Arc::new(ClientRegistry::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        info!(
            %local_addr,
            tick_rate = config.tick_rate,
            client_timeout_secs = config.client_timeout_secs,
            "telemetry server listening"
        );

        let listener = tokio::spawn(
            HeartbeatListener::new(Arc::clone(&socket), Arc::clone(&registry), Arc::clone(&events))
                .run(shutdown_rx.clone()),
        );
        let reaper = tokio::spawn(
            Reaper::new(Arc::clone(&registry), config.client_timeout(), Arc::clone(&events))
                .run(config.reap_interval, shutdown_rx.clone()),
        );
        let broadcaster = tokio::spawn(
            BroadcastLoop::new(
                config.tick_interval(),
                Arc::clone(&socket),
                Arc::clone(&registry),
                provider,
                events,
            )
            .run(shutdown_rx),
        );

        Ok(Self {
            local_addr,
            socket,
            registry,
            shutdown,
            listener,
            reaper,
            broadcaster,
        })
    }

    /// The address the socket is actually bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The live client registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Stop all schedules and close the socket.
    ///
    /// Returns once every task has exited. The socket is released only after
    /// the listener has confirmed it is no longer receiving.
    pub async fn stop(self) {
        let Self {
            local_addr,
            socket,
            registry: _,
            shutdown,
            listener,
            reaper,
            broadcaster,
        } = self;

        info!(%local_addr, "telemetry server stopping");
        shutdown.send_replace(true);

        for (name, task) in [
            ("listener", listener),
            ("reaper", reaper),
            ("broadcast", broadcaster),
        ] {
            if let Err(err) = task.await {
                error!(task = name, %err, "server task ended abnormally");
            }
        }

        // Every task has dropped its clone; this closes the socket.
        drop(socket);
        info!(%local_addr, "telemetry server stopped");
    }
}
