//! Heartbeat listener.
//!
//! Parks on the server socket and turns `ping` datagrams into registry
//! refreshes. Nothing else arriving on the socket means anything; it is
//! dropped without a log line.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, info};
use xrhand_net::is_heartbeat;

use crate::events::{EventSink, ServerEvent};
use crate::registry::ClientRegistry;

/// Large enough for any heartbeat; longer datagrams are truncated, which
/// does not matter since only the prefix is inspected.
const RECV_BUFFER_SIZE: usize = 2048;

/// Receives heartbeats and keeps the registry current.
pub struct HeartbeatListener {
    socket: Arc<UdpSocket>,
    registry: Arc<ClientRegistry>,
    events: Arc<dyn EventSink>,
}

impl HeartbeatListener {
    #[must_use]
    pub fn new(
        socket: Arc<UdpSocket>,
        registry: Arc<ClientRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            socket,
            registry,
            events,
        }
    }

    /// Process one datagram received at `now`.
    ///
    /// Returns `true` if it registered a new client.
    pub fn handle_datagram(&self, payload: &[u8], from: SocketAddr, now: Instant) -> bool {
        if !is_heartbeat(payload) {
            return false;
        }
        let is_new = self.registry.upsert(from, now);
        if is_new {
            self.events.emit(ServerEvent::ClientRegistered(from));
        }
        is_new
    }

    /// Receive until the shutdown signal fires (or its sender is dropped).
    ///
    /// Receive errors are reported and the loop carries on.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        info!("heartbeat listener started");

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                biased;
                // Either a stop request or the server handle was dropped.
                _ = shutdown.changed() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, from)) => {
                        self.handle_datagram(&buf[..len], from, Instant::now());
                    }
                    Err(err) => {
                        self.events.emit(ServerEvent::ReceiveError(err.to_string()));
                    }
                },
            }
        }

        debug!("heartbeat listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::events::ChannelSink;

    use super::*;

    async fn listener_with_sink() -> (
        HeartbeatListener,
        Arc<ClientRegistry>,
        tokio::sync::mpsc::UnboundedReceiver<ServerEvent>,
    ) {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let registry = Arc::new(ClientRegistry::new());
        let (sink, rx) = ChannelSink::new();
        let listener = HeartbeatListener::new(socket, Arc::clone(&registry), Arc::new(sink));
        (listener, registry, rx)
    }

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([192, 168, 0, 20], port))
    }

    #[tokio::test]
    async fn test_ping_registers_once() {
        let (listener, registry, mut events) = listener_with_sink().await;
        let start = Instant::now();

        assert!(listener.handle_datagram(b"ping", addr(40000), start));
        assert!(!listener.handle_datagram(
            b"ping",
            addr(40000),
            start + Duration::from_millis(500)
        ));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.age_of(&addr(40000), start + Duration::from_millis(500)),
            Some(Duration::ZERO)
        );
        assert_eq!(
            events.try_recv().unwrap(),
            ServerEvent::ClientRegistered(addr(40000))
        );
        assert!(events.try_recv().is_err(), "refresh must not re-announce");
    }

    #[tokio::test]
    async fn test_other_payloads_are_dropped_silently() {
        let (listener, registry, mut events) = listener_with_sink().await;
        let now = Instant::now();

        let mut corrupt = xrhand_net::encode(0.0, &[0.0; xrhand_net::codec::FLOAT_COUNT]);
        corrupt[xrhand_net::PACKET_SIZE - 1] = b'?';

        let payloads: [&[u8]; 5] = [b"hello", b"PING", b"\xff\xfe", b"", &corrupt];
        for payload in payloads {
            assert!(!listener.handle_datagram(payload, addr(40001), now));
        }
        assert!(registry.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_registers_real_sender_and_stops() {
        let (listener, registry, mut events) = listener_with_sink().await;
        let server_addr = listener.socket.local_addr().unwrap();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(listener.run(stop_rx));

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"ping", server_addr).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            ServerEvent::ClientRegistered(client.local_addr().unwrap())
        );
        assert_eq!(registry.len(), 1);

        stop_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("listener did not stop")
            .unwrap();
    }
}
