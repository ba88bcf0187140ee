//! Animation-source capability the controller consumes.

use engine_core::{Transform, Vec3};

/// Abstract animation system driving the skeleton. The controller queries
/// poses every tick and commands playback around ragdoll transitions; clip
/// completion comes back through
/// [`RagdollController::on_get_up_complete`](crate::RagdollController::on_get_up_complete).
pub trait AnimationPlayer {
    /// Current world pose of a body part for this frame.
    fn sample_pose(&self, part: usize) -> Transform;

    /// Enable or disable animation playback.
    fn set_enabled(&mut self, enabled: bool);

    /// Enable or disable root motion.
    fn set_root_motion(&mut self, enabled: bool);

    /// Start a recovery clip by name, cutting over immediately.
    fn play_get_up(&mut self, clip_name: &str);

    /// Move the character's root to a world position (ground-adjusted
    /// recovery placement).
    fn warp_root(&mut self, position: Vec3);

    /// Point the character's root along a world direction (already
    /// flattened to the ground plane).
    fn set_facing(&mut self, forward: Vec3);
}
