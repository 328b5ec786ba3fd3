//! Synthetic pose source.
//!
//! Stands in for a real tracking binding when the server is run on its own:
//! the head bobs, both wrists sway and the fingers open and close. Useful for
//! exercising consumers without a headset.

use std::time::Instant;

use xrhand_math::{BoneTransform, FINGER_BONES, Finger, HandSide, HandSkeleton, Quat, Vec3};

use crate::provider::PoseProvider;

/// Finger chains with their sideways offset from the palm centre, in metres.
const CHAINS: [(Finger, f32); 5] = [
    (Finger::Thumb, 0.035),
    (Finger::Index, 0.02),
    (Finger::Middle, 0.0),
    (Finger::Ring, -0.02),
    (Finger::Little, -0.038),
];

const SEGMENT_LENGTH: f32 = 0.025;

/// Animated poses driven by wall time since construction.
#[derive(Debug, Clone)]
pub struct SyntheticPose {
    started: Instant,
}

impl Default for SyntheticPose {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticPose {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    /// Head pose at `t` seconds.
    #[must_use]
    pub fn head_at(t: f32) -> BoneTransform {
        BoneTransform::new(
            Vec3::new(0.0, 1.6 + 0.02 * (t * 1.3).sin(), 0.0),
            Quat::from_rotation_y(0.25 * (t * 0.4).sin()),
        )
    }

    /// World-space hand skeleton at `t` seconds.
    #[must_use]
    pub fn skeleton_at(side: HandSide, t: f32) -> HandSkeleton {
        let mirror = match side {
            HandSide::Left => -1.0,
            HandSide::Right => 1.0,
        };
        let root = BoneTransform::new(
            Vec3::new(0.2 * mirror, 1.2 + 0.05 * (t * 0.8).sin(), 0.35),
            Quat::from_rotation_y(0.3 * mirror * (t * 0.5).sin()),
        );

        // 0 = open, 1 = fist.
        let curl = 0.5 + 0.5 * (t * 1.5).sin();

        let mut local = vec![BoneTransform::IDENTITY; FINGER_BONES];
        local[0] = BoneTransform::from_position(Vec3::new(0.0, 0.0, 0.03));
        for (finger, lateral) in CHAINS {
            let mut position = Vec3::new(lateral * mirror, 0.0, 0.06);
            let mut rotation = Quat::IDENTITY;
            for bone in finger.bone_indices() {
                rotation *= Quat::from_rotation_x(curl * 0.45);
                local[bone - 1] = BoneTransform::new(position, rotation);
                position += rotation * Vec3::new(0.0, 0.0, SEGMENT_LENGTH);
            }
        }

        let fingers = local
            .iter()
            .map(|bone| BoneTransform::from_local(&root, bone))
            .collect();
        HandSkeleton::new(root, fingers)
    }
}

impl PoseProvider for SyntheticPose {
    fn head_transform(&self) -> Option<BoneTransform> {
        Some(Self::head_at(self.elapsed()))
    }

    fn hand_transforms(&self, side: HandSide) -> Option<HandSkeleton> {
        Some(Self::skeleton_at(side, self.elapsed()))
    }
}
