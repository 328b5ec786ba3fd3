//! Bone transform type.
//!
//! [`BoneTransform`] is a rigid transform (position + rotation) for a single
//! tracked joint. The head, the wrists and every finger bone are carried as
//! bone transforms, either in world space or relative to a hand's root.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Number of floats a bone transform occupies on the wire: position (3) then
/// rotation (4, in `x, y, z, w` order).
pub const TRANSFORM_FLOATS: usize = 7;

/// A rigid transform for one tracked joint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoneTransform {
    /// Position, in metres.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
}

impl BoneTransform {
    /// The identity transform: origin, no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// The all-zero transform. This is what an untracked joint looks like
    /// after it has been through the wire encoding; note that its rotation
    /// is not a unit quaternion.
    pub const ZERO: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
    };

    /// Create a transform from a position and rotation.
    #[must_use]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a transform with the given position and no rotation.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Express this transform in the local frame of `root`.
    ///
    /// The relative position is `inverse(root.rotation) * (self.position -
    /// root.position)` and the relative rotation is `inverse(root.rotation) *
    /// self.rotation`. [`BoneTransform::from_local`] is the inverse operation.
    #[must_use]
    pub fn relative_to(&self, root: &BoneTransform) -> Self {
        let inverse = root.rotation.inverse();
        Self {
            position: inverse * (self.position - root.position),
            rotation: inverse * self.rotation,
        }
    }

    /// Recover the world transform of a bone expressed in `root`'s frame.
    #[must_use]
    pub fn from_local(root: &BoneTransform, local: &BoneTransform) -> Self {
        Self {
            position: root.rotation * local.position + root.position,
            rotation: root.rotation * local.rotation,
        }
    }

    /// Flatten into wire order: `px, py, pz, qx, qy, qz, qw`.
    #[must_use]
    pub fn to_array(&self) -> [f32; TRANSFORM_FLOATS] {
        let p = self.position;
        let q = self.rotation;
        [p.x, p.y, p.z, q.x, q.y, q.z, q.w]
    }

    /// Build a transform from wire order. No normalisation is applied, so an
    /// all-zero slot round-trips to [`BoneTransform::ZERO`].
    #[must_use]
    pub fn from_array(values: [f32; TRANSFORM_FLOATS]) -> Self {
        let [px, py, pz, qx, qy, qz, qw] = values;
        Self {
            position: Vec3::new(px, py, pz),
            rotation: Quat::from_xyzw(qx, qy, qz, qw),
        }
    }

    /// Read a transform from the first seven floats of `values`.
    ///
    /// Returns `None` if fewer than seven floats are available.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        let chunk: [f32; TRANSFORM_FLOATS] = values.get(..TRANSFORM_FLOATS)?.try_into().ok()?;
        Some(Self::from_array(chunk))
    }

    /// Whether this transform is the all-zero placeholder.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.position == Vec3::ZERO && self.rotation == Self::ZERO.rotation
    }

    /// Compute the 4×4 model matrix for this transform.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Approximate equality, comparing both components within `epsilon`.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &BoneTransform, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.rotation.abs_diff_eq(other.rotation, epsilon)
    }
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = BoneTransform::IDENTITY;
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_array_wire_order() {
        let t = BoneTransform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_xyzw(0.0, 0.0, 0.0, 1.0),
        );
        assert_eq!(t.to_array(), [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(BoneTransform::from_array(t.to_array()), t);
    }

    #[test]
    fn test_from_slice_too_short() {
        assert!(BoneTransform::from_slice(&[0.0; 6]).is_none());
        assert!(BoneTransform::from_slice(&[0.0; 9]).is_some());
    }

    #[test]
    fn test_zero_is_zero() {
        assert!(BoneTransform::ZERO.is_zero());
        assert!(!BoneTransform::IDENTITY.is_zero());
        assert!(BoneTransform::from_array([0.0; 7]).is_zero());
    }

    #[test]
    fn test_relative_to_rotated_root() {
        // Root turned 90° about +y: world +x becomes local +z.
        let root = BoneTransform::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let bone = BoneTransform::from_position(Vec3::new(1.0, 0.0, -1.0));
        let local = bone.relative_to(&root);
        assert!(local.position.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_relative_then_local_recovers_world() {
        let root = BoneTransform::new(
            Vec3::new(0.3, 1.2, -0.4),
            Quat::from_euler(glam::EulerRot::XYZ, 0.4, -1.1, 2.0),
        );
        let bone = BoneTransform::new(
            Vec3::new(0.35, 1.25, -0.31),
            Quat::from_euler(glam::EulerRot::XYZ, -0.2, 0.7, 1.3),
        );
        let local = bone.relative_to(&root);
        let world = BoneTransform::from_local(&root, &local);
        assert!(world.abs_diff_eq(&bone, 1e-5));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let t = BoneTransform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_z(0.5));
        let json = serde_json::to_string(&t).unwrap();
        let restored: BoneTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(t, restored);
    }
}
