//! Conversion from the engine's tracking frame into a robot frame.
//!
//! Poses leave the producer in the engine's left-handed frame (x right, y up,
//! z forward). Robot consumers work in a right-handed frame (x forward,
//! y left, z up). The change of basis is a fixed signed permutation.

use glam::{Mat3, Mat4, Vec3};
use serde::Serialize;

use crate::transform::BoneTransform;

/// Change of basis from engine axes to robot axes, column-major.
///
/// As rows: `[0, 0, 1]`, `[-1, 0, 0]`, `[0, 1, 0]`.
pub const ROBOT_FROM_ENGINE: Mat3 = Mat3::from_cols(
    Vec3::new(0.0, -1.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 0.0),
);

/// A pose expressed in the robot frame.
///
/// The rotation is kept as a matrix: the basis change flips handedness, so
/// the result is not generally representable as a quaternion in the source
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RobotPose {
    pub position: Vec3,
    pub rotation: Mat3,
}

impl RobotPose {
    /// Homogeneous 4×4 transform.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        let mut m = Mat4::from_mat3(self.rotation);
        m.w_axis = self.position.extend(1.0);
        m
    }
}

impl BoneTransform {
    /// Convert into the robot frame: `M · p` and `M · R · Mᵀ`.
    #[must_use]
    pub fn to_robot_frame(&self) -> RobotPose {
        let m = ROBOT_FROM_ENGINE;
        RobotPose {
            position: m * self.position,
            rotation: m * Mat3::from_quat(self.rotation) * m.transpose(),
        }
    }
}
