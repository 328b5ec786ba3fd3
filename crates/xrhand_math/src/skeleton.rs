//! Hand skeleton layout.
//!
//! A tracked hand has 26 bones. Bone 0 is the wrist (the root), bone 1 is the
//! palm root that every finger chain hangs off, and bones 2..=25 are the five
//! finger chains. Thumb has four joints, the other fingers five.

use serde::{Deserialize, Serialize};

use crate::transform::BoneTransform;

/// Bones per hand, root included.
pub const HAND_BONES: usize = 26;

/// Finger bones per hand (every bone except the wrist root).
pub const FINGER_BONES: usize = HAND_BONES - 1;

/// Which hand a skeleton belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Both sides, in wire order.
    pub const ALL: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HandSide::Left => "left",
            HandSide::Right => "right",
        }
    }
}

/// A named finger chain (plus the wrist and palm root) for bone lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Wrist,
    Palm,
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    /// Bone indices belonging to this chain, from proximal to distal.
    #[must_use]
    pub fn bone_indices(self) -> std::ops::RangeInclusive<usize> {
        match self {
            Finger::Wrist => 0..=0,
            Finger::Palm => 1..=1,
            Finger::Thumb => 2..=5,
            Finger::Index => 6..=10,
            Finger::Middle => 11..=15,
            Finger::Ring => 16..=20,
            Finger::Little => 21..=25,
        }
    }

    /// The skeleton bone index of `joint` within this chain, if it exists.
    #[must_use]
    pub fn bone_index(self, joint: usize) -> Option<usize> {
        let range = self.bone_indices();
        let index = range.start() + joint;
        range.contains(&index).then_some(index)
    }
}

/// World-space bone transforms for one hand, as supplied by a pose source.
///
/// `fingers` should hold [`FINGER_BONES`] entries in skeleton order (bones
/// 1..=25). Shorter skeletons are accepted here and rejected at encode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSkeleton {
    /// The wrist transform.
    pub root: BoneTransform,
    /// Finger bones 1..=25, in skeleton order.
    pub fingers: Vec<BoneTransform>,
}

impl HandSkeleton {
    #[must_use]
    pub fn new(root: BoneTransform, fingers: Vec<BoneTransform>) -> Self {
        Self { root, fingers }
    }

    /// Whether the skeleton carries every bone the wire format needs.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.fingers.len() >= FINGER_BONES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chains_cover_every_bone_once() {
        let chains = [
            Finger::Wrist,
            Finger::Palm,
            Finger::Thumb,
            Finger::Index,
            Finger::Middle,
            Finger::Ring,
            Finger::Little,
        ];
        let mut seen = [false; HAND_BONES];
        for chain in chains {
            for index in chain.bone_indices() {
                assert!(!seen[index], "bone {index} listed twice");
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_bone_index_lookup() {
        assert_eq!(Finger::Thumb.bone_index(0), Some(2));
        assert_eq!(Finger::Thumb.bone_index(3), Some(5));
        assert_eq!(Finger::Thumb.bone_index(4), None);
        assert_eq!(Finger::Little.bone_index(4), Some(25));
        assert_eq!(Finger::Wrist.bone_index(0), Some(0));
    }

    #[test]
    fn test_skeleton_completeness() {
        let full = HandSkeleton::new(
            BoneTransform::IDENTITY,
            vec![BoneTransform::IDENTITY; FINGER_BONES],
        );
        assert!(full.is_complete());

        let short = HandSkeleton::new(BoneTransform::IDENTITY, vec![BoneTransform::IDENTITY; 24]);
        assert!(!short.is_complete());
    }
}
