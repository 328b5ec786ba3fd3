//! # xrhand_receiver
//!
//! Consumer side of the telemetry stream. A [`TelemetryReceiver`] keeps its
//! endpoint registered with a server by sending `ping` on a fixed cadence
//! and exposes the newest decoded [`TelemetryFrame`](xrhand_net::TelemetryFrame)
//! through a `watch` channel.

pub mod error;
pub mod receiver;

pub use error::ReceiverError;
pub use receiver::{DEFAULT_PING_INTERVAL, ReceiverConfig, TelemetryReceiver};
