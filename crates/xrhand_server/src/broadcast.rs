//! Broadcast loop.
//!
//! Runs at a fixed rate. Each tick:
//!
//! 1. Capture the current pose from the provider.
//! 2. Encode it into a telemetry packet stamped with wall-clock time.
//! 3. Snapshot the client registry.
//! 4. Unicast the packet to every endpoint in the snapshot.
//!
//! Sends are fire-and-forget. A failed send is reported and the tick moves
//! on to the next endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};
use xrhand_net::TelemetryPacket;
use xrhand_net::pose::encode_snapshot;

use crate::events::{EventSink, ServerEvent};
use crate::provider::{PoseProvider, PoseSnapshot};
use crate::registry::ClientRegistry;

/// Seconds since the Unix epoch, UTC.
#[must_use]
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// The tick counter after this tick.
    pub tick_id: u64,
    /// Endpoints in the registry snapshot.
    pub endpoints: usize,
    /// Endpoints the packet was handed to without error.
    pub sent: usize,
}

/// The fixed-rate fan-out loop.
pub struct BroadcastLoop {
    /// Current tick counter.
    tick_id: u64,
    /// Time between ticks.
    tick_interval: Duration,
    socket: Arc<UdpSocket>,
    registry: Arc<ClientRegistry>,
    provider: Arc<dyn PoseProvider>,
    events: Arc<dyn EventSink>,
}

impl BroadcastLoop {
    #[must_use]
    pub fn new(
        tick_interval: Duration,
        socket: Arc<UdpSocket>,
        registry: Arc<ClientRegistry>,
        provider: Arc<dyn PoseProvider>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            tick_id: 0,
            tick_interval,
            socket,
            registry,
            provider,
            events,
        }
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Capture the provider and encode a packet stamped with `timestamp`.
    #[must_use]
    pub fn build_packet(&self, timestamp: f64) -> TelemetryPacket {
        let snapshot = PoseSnapshot::capture(self.provider.as_ref());
        encode_snapshot(
            timestamp,
            snapshot.left.as_ref(),
            snapshot.right.as_ref(),
            snapshot.head.as_ref(),
        )
    }

    /// Run one tick: encode once, send to every registered endpoint.
    pub async fn tick(&mut self) -> TickReport {
        self.tick_id += 1;

        let bytes = self.build_packet(unix_timestamp()).encode();
        let endpoints = self.registry.snapshot();
        let mut sent = 0;

        for endpoint in &endpoints {
            match self.socket.send_to(&bytes, *endpoint).await {
                Ok(_) => sent += 1,
                Err(err) => self.events.emit(ServerEvent::SendError {
                    endpoint: *endpoint,
                    message: err.to_string(),
                }),
            }
        }

        trace!(
            tick_id = self.tick_id,
            endpoints = endpoints.len(),
            sent,
            "broadcast tick"
        );

        TickReport {
            tick_id: self.tick_id,
            endpoints: endpoints.len(),
            sent,
        }
    }

    /// Tick at the configured rate until the shutdown signal fires.
    ///
    /// A tick that overruns its budget is logged and the schedule slides
    /// rather than bursting to catch up.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.tick_interval.as_secs_f64() * 1000.0,
            "broadcast loop started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    let start = Instant::now();
                    self.tick().await;
                    let elapsed = start.elapsed();
                    if elapsed > self.tick_interval {
                        warn!(
                            tick_id = self.tick_id,
                            elapsed_ms = elapsed.as_millis() as u64,
                            budget_ms = self.tick_interval.as_millis() as u64,
                            "tick exceeded time budget"
                        );
                    }
                }
            }
        }

        debug!(ticks = self.tick_id, "broadcast loop stopped");
    }
}
