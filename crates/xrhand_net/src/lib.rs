//! # xrhand_net
//!
//! Wire layer for hand tracking telemetry.
//!
//! This crate provides:
//!
//! - [`codec`]: the fixed 1500-byte `HND0`/`HND1` packet format.
//! - [`pose`]: conversion of world-space skeletons into the wrist-relative
//!   float layout carried by a packet.
//! - [`frame`]: structured decoding of a packet back into hand and head
//!   poses on the consumer side.
//! - [`retarget`]: mapping a decoded hand onto RH56F1 robot-hand joints.
//! - [`heartbeat`]: the `ping` discovery datagram.
//! - [`error`]: wire-layer error types.

pub mod codec;
pub mod error;
pub mod frame;
pub mod heartbeat;
pub mod pose;
pub mod retarget;

pub use codec::{PACKET_SIZE, TelemetryPacket, decode, encode};
pub use error::NetError;
pub use frame::{HandPose, TelemetryFrame};
pub use heartbeat::{HEARTBEAT, is_heartbeat};
pub use pose::{encode_hand, encode_head, encode_skeleton, encode_snapshot};
pub use retarget::{RH56F1_JOINT_NAMES, Rh56f1Angles};
