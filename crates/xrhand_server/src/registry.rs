//! Client registry: tracks which consumers are alive.
//!
//! A consumer is an endpoint that has sent a heartbeat recently. The
//! listener refreshes entries, the reaper evicts stale ones, and the
//! broadcast loop iterates a snapshot every tick. All three run
//! concurrently, so every operation here takes `&self`.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Registry of live consumers, keyed by endpoint, holding the monotonic time
/// of each consumer's last heartbeat.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<SocketAddr, Instant>,
}

impl ClientRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    /// Record a heartbeat from `endpoint` at `now`.
    ///
    /// Returns `true` if the endpoint had no entry, i.e. this is a new
    /// registration. The check and the write happen under one shard lock.
    pub fn upsert(&self, endpoint: SocketAddr, now: Instant) -> bool {
        match self.clients.entry(endpoint) {
            Entry::Occupied(mut entry) => {
                entry.insert(now);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Remove an endpoint unconditionally.
    ///
    /// Returns `true` if the endpoint was registered.
    pub fn remove(&self, endpoint: &SocketAddr) -> bool {
        self.clients.remove(endpoint).is_some()
    }

    /// Remove an endpoint only if its last heartbeat is more than `timeout`
    /// before `now`. The age is checked under the same lock as the removal,
    /// so a heartbeat that lands mid-sweep keeps the entry alive.
    ///
    /// Returns `true` if the endpoint was removed.
    pub fn remove_if_stale(&self, endpoint: &SocketAddr, now: Instant, timeout: Duration) -> bool {
        self.clients
            .remove_if(endpoint, |_, last_seen| {
                now.saturating_duration_since(*last_seen) > timeout
            })
            .is_some()
    }

    /// A point-in-time copy of every registered endpoint.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SocketAddr> {
        self.clients.iter().map(|entry| *entry.key()).collect()
    }

    /// Endpoints whose last heartbeat is more than `timeout` before `now`.
    #[must_use]
    pub fn stale(&self, now: Instant, timeout: Duration) -> Vec<SocketAddr> {
        self.clients
            .iter()
            .filter(|entry| now.saturating_duration_since(*entry.value()) > timeout)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Time since the endpoint's last heartbeat, or `None` if unregistered.
    #[must_use]
    pub fn age_of(&self, endpoint: &SocketAddr, now: Instant) -> Option<Duration> {
        self.clients
            .get(endpoint)
            .map(|last_seen| now.saturating_duration_since(*last_seen))
    }

    /// Whether the endpoint is registered.
    #[must_use]
    pub fn contains(&self, endpoint: &SocketAddr) -> bool {
        self.clients.contains_key(endpoint)
    }

    /// Returns the number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
