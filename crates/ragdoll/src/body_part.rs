//! Per-part mutable runtime state.

use engine_core::{Transform, Vec3};
use glam::Quat;
use physics::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};

/// What currently drives a part's pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartDrive {
    /// Kinematic, following the animation source.
    Animated,
    /// Dynamic, simulated by physics.
    Simulated,
    /// Kinematic, holding its pose (constrained part frozen during a
    /// partial reaction without joints).
    Frozen,
}

/// Useful information for each body part.
#[derive(Debug)]
pub struct BodyPart {
    /// Index of this part in the skeleton layout.
    pub index: usize,
    /// Current world pose.
    pub transform: Transform,
    /// Rest offset from the parent part, captured at initialization.
    /// Restored during blending so limb proportions survive the ragdoll.
    pub local_offset: Vec3,
    /// Local-space point where a constraint anchor attaches (the child
    /// attachment, e.g. the foot for a knee).
    pub joint_anchor: Vec3,
    /// Simulated rigid body.
    pub body: RigidBodyHandle,
    /// Collision volume.
    pub collider: ColliderHandle,
    /// Fixed world body the constraint joint anchors to, if this part is
    /// constrained and joints are in use.
    pub anchor_body: Option<RigidBodyHandle>,
    /// Live constraint joint while locked.
    pub constraint_joint: Option<ImpulseJointHandle>,
    /// Position last frame, for kinematic velocity estimation.
    pub prev_position: Vec3,
    /// Finite-difference velocity while the body is kinematic. Used as the
    /// launch velocity when ragdoll starts without an overall velocity.
    pub custom_velocity: Vec3,
    /// Extra force fed to the body every ragdoll step.
    pub extra_force: Vec3,
    /// World position captured when a blend starts.
    pub transition_position: Vec3,
    /// World rotation captured when a blend starts.
    pub transition_rotation: Quat,
    /// Current drive mode.
    pub drive: PartDrive,
}

impl BodyPart {
    pub(crate) fn new(
        index: usize,
        pose: Transform,
        local_offset: Vec3,
        joint_anchor: Vec3,
        body: RigidBodyHandle,
        collider: ColliderHandle,
    ) -> Self {
        Self {
            index,
            transform: pose,
            local_offset,
            joint_anchor,
            body,
            collider,
            anchor_body: None,
            constraint_joint: None,
            prev_position: pose.position,
            custom_velocity: Vec3::ZERO,
            extra_force: Vec3::ZERO,
            transition_position: pose.position,
            transition_rotation: pose.rotation,
            drive: PartDrive::Animated,
        }
    }

    /// Capture the current pose as the blend-start snapshot.
    pub(crate) fn snapshot_transition(&mut self) {
        self.transition_position = self.transform.position;
        self.transition_rotation = self.transform.rotation;
    }
}
