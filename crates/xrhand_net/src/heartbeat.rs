//! Discovery heartbeats.
//!
//! A consumer announces itself by sending a datagram whose payload starts
//! with the ASCII bytes `ping`. Whatever follows is ignored. Nothing is sent
//! back; the consumer just starts receiving telemetry.

/// The payload a consumer sends to register or stay registered.
pub const HEARTBEAT: &[u8] = b"ping";

/// Whether `payload` is a heartbeat.
///
/// Only the leading four bytes are inspected. Payloads that do not start with
/// the exact ASCII token, including non-ASCII data, are not heartbeats.
#[must_use]
pub fn is_heartbeat(payload: &[u8]) -> bool {
    payload.starts_with(HEARTBEAT)
}
