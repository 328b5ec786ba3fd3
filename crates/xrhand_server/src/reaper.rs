//! Reaper: evicts clients that stopped sending heartbeats.
//!
//! Eviction is purely time-based. A client is never dropped because sends to
//! it fail; it is dropped because it went quiet for longer than the timeout.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::events::{EventSink, ServerEvent};
use crate::registry::ClientRegistry;

/// Periodic sweep over the client registry.
pub struct Reaper {
    registry: Arc<ClientRegistry>,
    timeout: Duration,
    events: Arc<dyn EventSink>,
}

impl Reaper {
    #[must_use]
    pub fn new(registry: Arc<ClientRegistry>, timeout: Duration, events: Arc<dyn EventSink>) -> Self {
        Self {
            registry,
            timeout,
            events,
        }
    }

    /// Evict every client silent for longer than the timeout as of `now`.
    ///
    /// Emits one [`ServerEvent::ClientTimedOut`] per eviction and returns
    /// the evicted endpoints.
    pub fn sweep(&self, now: Instant) -> Vec<SocketAddr> {
        let mut evicted = Vec::new();
        for endpoint in self.registry.stale(now, self.timeout) {
            // Re-checked under the entry lock: a heartbeat may have landed
            // since `stale` looked.
            if self.registry.remove_if_stale(&endpoint, now, self.timeout) {
                self.events.emit(ServerEvent::ClientTimedOut(endpoint));
                evicted.push(endpoint);
            }
        }
        evicted
    }

    /// Sweep every `interval` until the shutdown signal fires.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            timeout_ms = self.timeout.as_millis() as u64,
            interval_ms = interval.as_millis() as u64,
            "reaper started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    let evicted = self.sweep(Instant::now());
                    if !evicted.is_empty() {
                        debug!(
                            evicted = evicted.len(),
                            remaining = self.registry.len(),
                            "reaper sweep"
                        );
                    }
                }
            }
        }

        debug!("reaper stopped");
    }
}

#[cfg(test)]
mod tests {
    use crate::events::ChannelSink;

    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([10, 1, 1, 1], port))
    }

    fn reaper() -> (
        Reaper,
        Arc<ClientRegistry>,
        tokio::sync::mpsc::UnboundedReceiver<ServerEvent>,
    ) {
        let registry = Arc::new(ClientRegistry::new());
        let (sink, rx) = ChannelSink::new();
        let reaper = Reaper::new(Arc::clone(&registry), Duration::from_secs(5), Arc::new(sink));
        (reaper, registry, rx)
    }

    #[test]
    fn test_fresh_clients_survive() {
        let (reaper, registry, mut events) = reaper();
        let start = Instant::now();
        registry.upsert(addr(1), start);
        assert!(reaper.sweep(start + Duration::from_secs(5)).is_empty());
        assert_eq!(registry.len(), 1);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_stale_client_evicted_once() {
        let (reaper, registry, mut events) = reaper();
        let start = Instant::now();
        registry.upsert(addr(1), start);
        registry.upsert(addr(2), start + Duration::from_secs(3));

        let now = start + Duration::from_secs(6);
        assert_eq!(reaper.sweep(now), vec![addr(1)]);
        assert!(reaper.sweep(now).is_empty());

        assert_eq!(registry.snapshot(), vec![addr(2)]);
        assert_eq!(events.try_recv().unwrap(), ServerEvent::ClientTimedOut(addr(1)));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_regular_heartbeats_never_evicted() {
        let (reaper, registry, _events) = reaper();
        let start = Instant::now();
        let mut new_count = 0;
        for step in 0..40 {
            let now = start + Duration::from_millis(500 * step);
            if registry.upsert(addr(1), now) {
                new_count += 1;
            }
            reaper.sweep(now);
            assert!(registry.contains(&addr(1)));
        }
        assert_eq!(new_count, 1);
    }

    #[test]
    fn test_heartbeat_after_eviction_is_new() {
        let (reaper, registry, _events) = reaper();
        let start = Instant::now();
        registry.upsert(addr(1), start);
        reaper.sweep(start + Duration::from_secs(6));
        assert!(registry.upsert(addr(1), start + Duration::from_secs(7)));
    }

    #[tokio::test]
    async fn test_run_evicts_and_stops() {
        let registry = Arc::new(ClientRegistry::new());
        let (sink, mut events) = ChannelSink::new();
        let reaper = Reaper::new(
            Arc::clone(&registry),
            Duration::from_millis(50),
            Arc::new(sink),
        );
        registry.upsert(addr(1), Instant::now());

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(reaper.run(Duration::from_millis(10), stop_rx));

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, ServerEvent::ClientTimedOut(addr(1)));
        assert!(registry.is_empty());

        stop_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("reaper did not stop")
            .unwrap();
    }
}
