//! # xrhand_server
//!
//! Broadcasts hand and head tracking over UDP to whoever asks for it.
//!
//! Consumers announce themselves by sending `ping` to the server port at
//! least once every few seconds. The server runs three schedules over one
//! shared socket:
//!
//! 1. The [`listener`] registers or refreshes the sender of every heartbeat.
//! 2. The [`reaper`] evicts clients that have gone quiet.
//! 3. The [`broadcast`] loop encodes the current pose once per tick and
//!    unicasts it to every registered client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xrhand_server::{LogSink, ServerConfig, SyntheticPose, TelemetryServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = TelemetryServer::start(
//!         ServerConfig::default().with_tick_rate(90.0),
//!         Arc::new(SyntheticPose::new()),
//!         Arc::new(LogSink),
//!     )
//!     .await
//!     .unwrap();
//!
//!     tokio::signal::ctrl_c().await.unwrap();
//!     server.stop().await;
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod error;
pub mod events;
pub mod listener;
pub mod provider;
pub mod reaper;
pub mod registry;
pub mod service;
pub mod synthetic;

pub use broadcast::{BroadcastLoop, TickReport};
pub use config::ServerConfig;
pub use error::{ConfigError, ServerError};
pub use events::{ChannelSink, EventSink, LogSink, ServerEvent};
pub use provider::{PoseProvider, PoseSnapshot, SharedPose};
pub use registry::ClientRegistry;
pub use service::TelemetryServer;
pub use synthetic::SyntheticPose;
