//! Trait for anything a projectile or melee system can knock down.

use engine_core::Vec3;
use ragdoll::RagdollController;

/// A combat target that owns a ragdoll controller. Weapon code talks to
/// this trait instead of the controller so a target can refuse hits (shield
/// up, cutscene, already despawning) through `ignore_hit`.
pub trait RagdollUser {
    fn controller(&self) -> &RagdollController;
    fn controller_mut(&mut self) -> &mut RagdollController;

    /// Whether incoming hits are currently refused outright, before the
    /// controller's own policy gate is consulted.
    fn ignore_hit(&self) -> bool;
    fn set_ignore_hit(&mut self, ignore: bool);

    /// Queue a localized hit reaction unless hits are ignored.
    fn start_hit_reaction(&mut self, hit_parts: Vec<usize>, hit_velocity: Vec3) {
        if self.ignore_hit() {
            log::debug!("hit reaction refused: ignore_hit set");
            return;
        }
        self.controller_mut()
            .request_hit_reaction(hit_parts, hit_velocity, false);
    }

    /// Queue a full ragdoll unless hits are ignored.
    fn start_ragdoll(
        &mut self,
        hit_parts: Option<Vec<usize>>,
        hit_velocity: Option<Vec3>,
        overall_velocity: Option<Vec3>,
    ) {
        if self.ignore_hit() {
            log::debug!("ragdoll refused: ignore_hit set");
            return;
        }
        self.controller_mut()
            .request_ragdoll(hit_parts, hit_velocity, overall_velocity, false);
    }
}
