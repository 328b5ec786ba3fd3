//! Structured view of a decoded packet.
//!
//! Consumers rarely want 371 loose floats. [`TelemetryFrame`] splits a
//! packet into two [`HandPose`]s and a head transform, and a hand pose can
//! rebuild its world-space skeleton from the wrist-relative encoding.

use serde::{Deserialize, Serialize};
use xrhand_math::transform::TRANSFORM_FLOATS;
use xrhand_math::{BoneTransform, FINGER_BONES, Finger, HAND_BONES, HandSide};

use crate::codec::{self, TelemetryPacket};
use crate::error::NetError;

/// One hand as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    /// Wrist transform, world space.
    pub root: BoneTransform,
    /// Bones 1..=25, each relative to the wrist.
    pub fingers: [BoneTransform; FINGER_BONES],
}

impl HandPose {
    /// Read a hand from its 182-float section.
    ///
    /// Missing trailing floats read as zero.
    #[must_use]
    pub fn from_floats(values: &[f32]) -> Self {
        Self {
            root: transform_at(values, 0),
            fingers: std::array::from_fn(|i| transform_at(values, i + 1)),
        }
    }

    /// A hand the producer could not track is sent as zeros, which leaves a
    /// zero root rotation behind. Real rotations are unit quaternions.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        !self.root.is_zero()
    }

    /// All 26 bones in world space, in skeleton order.
    #[must_use]
    pub fn world_bones(&self) -> [BoneTransform; HAND_BONES] {
        std::array::from_fn(|i| match i {
            0 => self.root,
            _ => BoneTransform::from_local(&self.root, &self.fingers[i - 1]),
        })
    }

    /// World-space transform of `joint` along `finger`.
    #[must_use]
    pub fn bone(&self, finger: Finger, joint: usize) -> Option<BoneTransform> {
        match finger.bone_index(joint)? {
            0 => Some(self.root),
            index => Some(BoneTransform::from_local(
                &self.root,
                &self.fingers[index - 1],
            )),
        }
    }

    /// Wrist-relative transform of `joint` along `finger`.
    #[must_use]
    pub fn local_bone(&self, finger: Finger, joint: usize) -> Option<BoneTransform> {
        match finger.bone_index(joint)? {
            0 => Some(BoneTransform::IDENTITY),
            index => Some(self.fingers[index - 1]),
        }
    }
}

/// A decoded packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    /// Producer wall-clock time, seconds since the Unix epoch.
    pub timestamp: f64,
    pub left: HandPose,
    pub right: HandPose,
    pub head: BoneTransform,
}

impl TelemetryFrame {
    #[must_use]
    pub fn from_packet(packet: &TelemetryPacket) -> Self {
        Self {
            timestamp: packet.timestamp,
            left: HandPose::from_floats(packet.left()),
            right: HandPose::from_floats(packet.right()),
            head: transform_at(packet.head(), 0),
        }
    }

    /// Decode a datagram straight into a frame.
    ///
    /// # Errors
    ///
    /// Returns a [`NetError`] if the datagram is not a valid packet.
    pub fn decode(bytes: &[u8]) -> Result<Self, NetError> {
        codec::decode(bytes).map(|packet| Self::from_packet(&packet))
    }

    #[must_use]
    pub fn hand(&self, side: HandSide) -> &HandPose {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    /// Whether the producer had a head pose for this tick.
    #[must_use]
    pub fn has_head(&self) -> bool {
        !self.head.is_zero()
    }
}

fn transform_at(values: &[f32], slot: usize) -> BoneTransform {
    values
        .get(slot * TRANSFORM_FLOATS..)
        .and_then(BoneTransform::from_slice)
        .unwrap_or(BoneTransform::ZERO)
}
