//! Pose sources.
//!
//! The broadcast loop does not know where poses come from. Anything that can
//! hand over a head transform and two hand skeletons in world space on demand
//! implements [`PoseProvider`]: an engine binding, a simulator, a recording,
//! a test fixture.

use std::sync::RwLock;

use xrhand_math::{BoneTransform, HandSide, HandSkeleton};

/// Supplies the current tracked pose once per broadcast tick.
///
/// Called from the broadcast task; implementations should return quickly.
pub trait PoseProvider: Send + Sync + 'static {
    /// Current head transform, or `None` if the head is not tracked.
    fn head_transform(&self) -> Option<BoneTransform>;

    /// Current skeleton for one hand, or `None` if that hand is not tracked.
    fn hand_transforms(&self, side: HandSide) -> Option<HandSkeleton>;
}

/// Everything a provider reports for one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseSnapshot {
    pub head: Option<BoneTransform>,
    pub left: Option<HandSkeleton>,
    pub right: Option<HandSkeleton>,
}

impl PoseSnapshot {
    /// Capture a snapshot from any provider.
    #[must_use]
    pub fn capture(provider: &dyn PoseProvider) -> Self {
        Self {
            head: provider.head_transform(),
            left: provider.hand_transforms(HandSide::Left),
            right: provider.hand_transforms(HandSide::Right),
        }
    }

    #[must_use]
    pub fn hand(&self, side: HandSide) -> Option<&HandSkeleton> {
        match side {
            HandSide::Left => self.left.as_ref(),
            HandSide::Right => self.right.as_ref(),
        }
    }
}

/// A provider the host pushes poses into.
///
/// The host's tracking callback calls [`SharedPose::set`] (or one of the
/// narrower setters) whenever it has fresh data; the broadcast loop reads
/// whatever is newest.
#[derive(Debug, Default)]
pub struct SharedPose {
    latest: RwLock<PoseSnapshot>,
}

impl SharedPose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot.
    pub fn set(&self, snapshot: PoseSnapshot) {
        *self.latest.write().unwrap_or_else(|e| e.into_inner()) = snapshot;
    }

    /// Update the head only.
    pub fn set_head(&self, head: Option<BoneTransform>) {
        self.latest.write().unwrap_or_else(|e| e.into_inner()).head = head;
    }

    /// Update one hand only.
    pub fn set_hand(&self, side: HandSide, skeleton: Option<HandSkeleton>) {
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        match side {
            HandSide::Left => latest.left = skeleton,
            HandSide::Right => latest.right = skeleton,
        }
    }

    /// A copy of the current snapshot.
    #[must_use]
    pub fn get(&self) -> PoseSnapshot {
        self.latest.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PoseProvider for SharedPose {
    fn head_transform(&self) -> Option<BoneTransform> {
        self.latest.read().unwrap_or_else(|e| e.into_inner()).head
    }

    fn hand_transforms(&self, side: HandSide) -> Option<HandSkeleton> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .hand(side)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use xrhand_math::{FINGER_BONES, Vec3};

    use super::*;

    fn skeleton(x: f32) -> HandSkeleton {
        HandSkeleton::new(
            BoneTransform::from_position(Vec3::new(x, 1.0, 0.0)),
            vec![BoneTransform::IDENTITY; FINGER_BONES],
        )
    }

    #[test]
    fn test_empty_shared_pose_reports_nothing() {
        let shared = SharedPose::new();
        assert_eq!(PoseSnapshot::capture(&shared), PoseSnapshot::default());
    }

    #[test]
    fn test_setters_update_independently() {
        let shared = SharedPose::new();
        shared.set_hand(HandSide::Left, Some(skeleton(-0.2)));
        shared.set_head(Some(BoneTransform::from_position(Vec3::Y)));

        let snapshot = PoseSnapshot::capture(&shared);
        assert_eq!(snapshot.left, Some(skeleton(-0.2)));
        assert!(snapshot.right.is_none());
        assert_eq!(snapshot.head.map(|h| h.position), Some(Vec3::Y));

        shared.set_hand(HandSide::Left, None);
        assert!(shared.hand_transforms(HandSide::Left).is_none());
        assert!(shared.head_transform().is_some());
    }

    #[test]
    fn test_set_replaces_everything() {
        let shared = SharedPose::new();
        shared.set_head(Some(BoneTransform::IDENTITY));
        shared.set(PoseSnapshot {
            head: None,
            left: None,
            right: Some(skeleton(0.2)),
        });
        let snapshot = shared.get();
        assert!(snapshot.head.is_none());
        assert_eq!(snapshot.hand(HandSide::Right), Some(&skeleton(0.2)));
    }
}
