//! # xrhand_math
//!
//! Spatial types for hand and head tracking telemetry. Re-exports [`glam`]
//! for linear algebra and defines the bone transform and hand skeleton types
//! shared by the producer and consumers.

pub mod frame;
pub mod skeleton;
pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

pub use frame::{ROBOT_FROM_ENGINE, RobotPose};
pub use skeleton::{FINGER_BONES, Finger, HAND_BONES, HandSide, HandSkeleton};
pub use transform::BoneTransform;
