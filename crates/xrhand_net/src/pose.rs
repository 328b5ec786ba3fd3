//! Pose encoding.
//!
//! Hands are sent in the wrist's local frame: the wrist itself is absolute,
//! each finger bone is expressed relative to it. A consumer can therefore
//! re-anchor the finger pose on its own wrist estimate without undoing the
//! producer's world placement.
//!
//! Incomplete input never fails the tick. A hand with missing bones, or no
//! hand at all, encodes as zeros so the other hand and the head still go out.

use tracing::trace;
use xrhand_math::transform::TRANSFORM_FLOATS;
use xrhand_math::{BoneTransform, FINGER_BONES, HandSkeleton};

use crate::codec::{HAND_FLOATS, HEAD_FLOATS, TelemetryPacket};

/// Encode one hand: the root as-is, then the first 25 fingers relative to it.
///
/// Returns all zeros if fewer than 25 finger bones are supplied. Bones past
/// the 25th are ignored.
#[must_use]
pub fn encode_hand(root: &BoneTransform, fingers: &[BoneTransform]) -> [f32; HAND_FLOATS] {
    let mut out = [0.0; HAND_FLOATS];
    if fingers.len() < FINGER_BONES {
        trace!(
            fingers = fingers.len(),
            required = FINGER_BONES,
            "incomplete hand skeleton, sending zeros"
        );
        return out;
    }

    let (root_slot, finger_slots) = out.split_at_mut(TRANSFORM_FLOATS);
    root_slot.copy_from_slice(&root.to_array());
    for (slot, finger) in finger_slots
        .chunks_exact_mut(TRANSFORM_FLOATS)
        .zip(fingers)
    {
        slot.copy_from_slice(&finger.relative_to(root).to_array());
    }
    out
}

/// Encode an optional skeleton; an absent hand is all zeros.
#[must_use]
pub fn encode_skeleton(skeleton: Option<&HandSkeleton>) -> [f32; HAND_FLOATS] {
    match skeleton {
        Some(skeleton) => encode_hand(&skeleton.root, &skeleton.fingers),
        None => [0.0; HAND_FLOATS],
    }
}

/// Encode the head pose verbatim, or zeros if it is not tracked.
#[must_use]
pub fn encode_head(head: Option<&BoneTransform>) -> [f32; HEAD_FLOATS] {
    head.map(BoneTransform::to_array).unwrap_or([0.0; HEAD_FLOATS])
}

/// Build a full packet from one snapshot of pose input.
#[must_use]
pub fn encode_snapshot(
    timestamp: f64,
    left: Option<&HandSkeleton>,
    right: Option<&HandSkeleton>,
    head: Option<&BoneTransform>,
) -> TelemetryPacket {
    TelemetryPacket::new(
        timestamp,
        &encode_skeleton(left),
        &encode_skeleton(right),
        &encode_head(head),
    )
}

#[cfg(test)]
mod tests {
    use xrhand_math::{EulerRot, Quat, Vec3};

    use super::*;

    /// A plausible world-space hand: wrist tilted and offset, fingers fanned.
    fn sample_hand() -> HandSkeleton {
        let root = BoneTransform::new(
            Vec3::new(0.2, 1.1, 0.4),
            Quat::from_euler(EulerRot::YXZ, 0.3, -0.8, 0.1),
        );
        let fingers = (0..FINGER_BONES)
            .map(|i| {
                let t = i as f32;
                BoneTransform::new(
                    Vec3::new(0.2 + 0.01 * t, 1.15 + 0.002 * t, 0.42 - 0.004 * t),
                    Quat::from_euler(EulerRot::YXZ, 0.05 * t, 0.3, -0.02 * t),
                )
            })
            .collect();
        HandSkeleton::new(root, fingers)
    }

    #[test]
    fn test_root_is_absolute() {
        let hand = sample_hand();
        let encoded = encode_hand(&hand.root, &hand.fingers);
        assert_eq!(&encoded[..7], &hand.root.to_array());
    }

    #[test]
    fn test_reconstruction_recovers_world_fingers() {
        let hand = sample_hand();
        let encoded = encode_hand(&hand.root, &hand.fingers);
        let root = BoneTransform::from_slice(&encoded[..7]).unwrap();

        for (i, finger) in hand.fingers.iter().enumerate() {
            let start = TRANSFORM_FLOATS * (i + 1);
            let local = BoneTransform::from_slice(&encoded[start..]).unwrap();
            let world_position = root.rotation * local.position + root.position;
            let world_rotation = root.rotation * local.rotation;
            assert!(
                world_position.abs_diff_eq(finger.position, 1e-5),
                "finger {i} position"
            );
            assert!(
                world_rotation.abs_diff_eq(finger.rotation, 1e-5),
                "finger {i} rotation"
            );
        }
    }

    #[test]
    fn test_invariant_to_wrist_placement() {
        let hand = sample_hand();
        let encoded = encode_hand(&hand.root, &hand.fingers);

        // Move and turn the whole hand rigidly; the finger section must not change.
        let shift = BoneTransform::new(Vec3::new(-3.0, 0.5, 2.0), Quat::from_rotation_y(1.2));
        let moved_root = BoneTransform::from_local(&shift, &hand.root);
        let moved_fingers: Vec<_> = hand
            .fingers
            .iter()
            .map(|f| BoneTransform::from_local(&shift, f))
            .collect();
        let moved = encode_hand(&moved_root, &moved_fingers);

        for (a, b) in encoded[7..].iter().zip(&moved[7..]) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn test_incomplete_hand_is_zeroed() {
        let hand = sample_hand();
        let encoded = encode_hand(&hand.root, &hand.fingers[..24]);
        assert!(encoded.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_extra_fingers_ignored() {
        let hand = sample_hand();
        let mut fingers = hand.fingers.clone();
        fingers.push(BoneTransform::from_position(Vec3::splat(9.0)));
        assert_eq!(
            encode_hand(&hand.root, &fingers),
            encode_hand(&hand.root, &hand.fingers)
        );
    }

    #[test]
    fn test_head_verbatim_or_zero() {
        let head = BoneTransform::new(Vec3::new(0.0, 1.7, 0.0), Quat::from_rotation_x(0.2));
        assert_eq!(encode_head(Some(&head)), head.to_array());
        assert_eq!(encode_head(None), [0.0; HEAD_FLOATS]);
    }

    #[test]
    fn test_snapshot_with_one_missing_hand() {
        let hand = sample_hand();
        let head = BoneTransform::from_position(Vec3::new(0.0, 1.6, 0.0));
        let packet = encode_snapshot(5.0, None, Some(&hand), Some(&head));

        assert!(packet.left().iter().all(|&v| v == 0.0));
        assert_eq!(packet.right(), &encode_skeleton(Some(&hand)));
        assert_eq!(packet.head(), &head.to_array());
        assert_eq!(packet.timestamp, 5.0);
    }
}
