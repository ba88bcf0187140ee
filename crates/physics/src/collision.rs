//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for the ragdoll scene.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (ground, walls)
    Environment = 1 << 0,
    /// Ragdoll body parts while physics drives them
    RagdollActive = 1 << 1,
    /// Ragdoll body parts while animation drives them
    RagdollInactive = 1 << 2,
    /// Projectiles and other impactors
    Projectile = 1 << 3,
}

impl CollisionGroup {
    /// Membership/filter pair for static environment.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Membership/filter pair for ragdolled body parts. Collides with the
    /// environment, other active ragdolls, and projectiles.
    pub fn ragdoll_active() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::RagdollActive as u32);
        let filter = Group::from_bits_retain(
            Self::Environment as u32 | Self::RagdollActive as u32 | Self::Projectile as u32,
        );
        (membership, filter)
    }

    /// Membership/filter pair for animated body parts. Collides with
    /// nothing; parts follow the animation and must not push the scene
    /// around.
    pub fn ragdoll_inactive() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::RagdollInactive as u32);
        (membership, Group::NONE)
    }

    /// Membership/filter pair for projectiles.
    pub fn projectile() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Projectile as u32);
        let filter =
            Group::from_bits_retain(Self::Environment as u32 | Self::RagdollActive as u32);
        (membership, filter)
    }
}

/// Build rapier interaction groups from a membership/filter pair.
pub fn interaction_groups(pair: (Group, Group)) -> InteractionGroups {
    InteractionGroups::new(pair.0, pair.1)
}
