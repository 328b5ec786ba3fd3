//! Joint-angle retargeting for the Inspire RH56F1 robot hand.
//!
//! The RH56F1 has six actuated joints: thumb rotation, thumb bend, and one
//! flexion joint for each of the other four fingers. Its kinematics are
//! simple enough that every angle is read directly off one wrist-relative
//! bone in the robot frame; no solver is involved.
//!
//! | Joint | Source bone | Measure | Clamp |
//! |---|---|---|---|
//! | thumb rotation | thumb joint 1 | position angle about robot x | −10°..60° |
//! | thumb bend | thumb joint 3, in thumb joint 1's frame | x-axis angle about robot y | 0°..50° |
//! | index .. little | joint 4 | x-axis angle about robot y | 0°..180° |

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use xrhand_math::{BoneTransform, Finger, HandSide, RobotPose, Vec3};

use crate::frame::HandPose;

/// Actuated joints on an RH56F1.
pub const RH56F1_JOINTS: usize = 6;

/// Joint names, in output order.
pub const RH56F1_JOINT_NAMES: [&str; RH56F1_JOINTS] =
    ["thumb_rotation", "thumb_bend", "index", "middle", "ring", "little"];

/// Full-scale travel of each joint, in radians. Normalised output is the
/// clamped angle divided by this.
pub const RH56F1_RANGE: [f32; RH56F1_JOINTS] = [
    deg(70.0),
    deg(50.0),
    deg(180.0),
    deg(180.0),
    deg(180.0),
    deg(180.0),
];

const fn deg(degrees: f32) -> f32 {
    degrees * PI / 180.0
}

/// Joint targets for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rh56f1Angles {
    /// Clamped joint angles, radians.
    pub radians: [f32; RH56F1_JOINTS],
    /// `radians / RH56F1_RANGE`, nominally in `0..=1`.
    pub normalized: [f32; RH56F1_JOINTS],
}

impl Rh56f1Angles {
    fn from_radians(radians: [f32; RH56F1_JOINTS]) -> Self {
        Self {
            radians,
            normalized: std::array::from_fn(|i| radians[i] / RH56F1_RANGE[i]),
        }
    }
}

impl HandPose {
    /// Map this hand onto RH56F1 joint targets.
    ///
    /// `side` selects the thumb-rotation convention; the left thumb's
    /// position angle is measured from the opposite half-plane.
    #[must_use]
    pub fn rh56f1_angles(&self, side: HandSide) -> Rh56f1Angles {
        let thumb1 = self.robot_bone(Finger::Thumb, 1);
        let thumb3 = self.robot_bone(Finger::Thumb, 3);

        let elevation = position_angle(thumb1.position);
        let thumb_rotation = match side {
            HandSide::Left => wrap_to_tau(elevation - PI),
            HandSide::Right => wrap_to_tau(-elevation),
        };
        // Thumb tip axis expressed in the thumb base frame.
        let bend_axis = thumb1.rotation.transpose() * thumb3.rotation.x_axis;
        let thumb_bend = -normal_angle(bend_axis);

        let mut radians = [0.0; RH56F1_JOINTS];
        radians[0] = clamp_thumb_rotation(thumb_rotation);
        radians[1] = clamp_thumb_bend(thumb_bend);
        for (slot, finger) in radians[2..]
            .iter_mut()
            .zip([Finger::Index, Finger::Middle, Finger::Ring, Finger::Little])
        {
            let tip = self.robot_bone(finger, 4);
            *slot = clamp_flexion(wrap_to_tau(-normal_angle(tip.rotation.x_axis)));
        }

        Rh56f1Angles::from_radians(radians)
    }

    fn robot_bone(&self, finger: Finger, joint: usize) -> RobotPose {
        self.local_bone(finger, joint)
            .unwrap_or(BoneTransform::IDENTITY)
            .to_robot_frame()
    }
}

/// Angle of a position about robot x, measured from +y towards +z.
fn position_angle(p: Vec3) -> f32 {
    p.z.atan2(p.y)
}

/// Angle of an axis about robot y, measured from +x towards +z.
fn normal_angle(n: Vec3) -> f32 {
    n.z.atan2(n.x)
}

fn wrap_to_tau(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

fn clamp_thumb_rotation(angle: f32) -> f32 {
    angle.clamp(deg(-10.0), deg(60.0))
}

// Anything past 270° is a small negative angle that wrapped around.
fn clamp_thumb_bend(angle: f32) -> f32 {
    if angle > deg(270.0) || angle < 0.0 {
        0.0
    } else {
        angle.min(deg(50.0))
    }
}

fn clamp_flexion(angle: f32) -> f32 {
    if angle > deg(270.0) || angle < 0.0 {
        0.0
    } else {
        angle.min(deg(180.0))
    }
}
