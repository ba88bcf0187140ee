//! Pose blending from the last physically-simulated pose toward the live
//! animated pose.
//!
//! Pure functions of the snapshot, the animated target, and elapsed time.
//! The root blends world position and rotation; every other part blends
//! rotation while its position is restored toward the rest offset from its
//! parent, so limb proportions are preserved instead of interpolating
//! world positions independently.

use engine_core::{Transform, Vec3};
use glam::Quat;

/// Normalized blend progress, clamped to [0, 1]. A non-positive blend time
/// completes immediately.
pub fn blend_amount(elapsed: f32, blend_time: f32) -> f32 {
    if blend_time <= 0.0 {
        1.0
    } else {
        (elapsed / blend_time).clamp(0.0, 1.0)
    }
}

/// Blend the root part: world-position lerp and rotation slerp from the
/// transition snapshot toward the animated pose.
pub fn blend_root(
    snapshot_position: Vec3,
    snapshot_rotation: Quat,
    animated: &Transform,
    amount: f32,
) -> Transform {
    Transform::from_position_rotation(
        snapshot_position.lerp(animated.position, amount),
        snapshot_rotation.slerp(animated.rotation, amount),
    )
}

/// Blend a non-root part. Rotation slerps from the snapshot toward the
/// animated rotation; position converges from its current parent-local
/// offset toward the rest offset, evaluated against the parent's
/// already-blended pose. At `amount == 1` the part sits exactly at
/// `parent * rest_local_offset` with the animated rotation.
pub fn blend_limb(
    current_world_position: Vec3,
    snapshot_rotation: Quat,
    animated_rotation: Quat,
    blended_parent: &Transform,
    rest_local_offset: Vec3,
    amount: f32,
) -> Transform {
    let current_local = blended_parent.inverse_transform_point(current_world_position);
    let new_local = current_local.lerp(rest_local_offset, amount);
    Transform::from_position_rotation(
        blended_parent.transform_point(new_local),
        snapshot_rotation.slerp(animated_rotation, amount),
    )
}
