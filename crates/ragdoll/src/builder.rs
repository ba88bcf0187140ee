//! Ragdoll setup: binds a skeleton layout to physics bodies and produces a
//! ready controller.

use engine_core::{Transform, Vec3};
use glam::Quat;
use physics::{ExtraForceMode, PhysicsWorld};

use crate::body_part::BodyPart;
use crate::controller::RagdollController;
use crate::error::RagdollError;
use crate::settings::RagdollSettings;
use crate::skeleton::SkeletonLayout;

/// Capsule dimensions for a part's collision volume.
#[derive(Debug, Clone, Copy)]
pub struct Capsule {
    pub half_height: f32,
    pub radius: f32,
}

/// Per-part setup data supplied by the caller.
#[derive(Debug, Clone)]
pub struct PartBinding {
    /// Initial world pose, taken from the animated skeleton.
    pub pose: Transform,
    /// Collision capsule along the part's local Y axis.
    pub capsule: Capsule,
    /// Local point the constraint anchor grips (the child attachment, e.g.
    /// the foot for a knee). Ignored for unconstrained parts.
    pub joint_anchor: Vec3,
}

impl PartBinding {
    pub fn new(pose: Transform, capsule: Capsule) -> Self {
        Self {
            pose,
            capsule,
            joint_anchor: Vec3::ZERO,
        }
    }

    pub fn with_joint_anchor(mut self, anchor: Vec3) -> Self {
        self.joint_anchor = anchor;
        self
    }
}

/// Builds a [`RagdollController`]: collect one binding per layout part, then
/// `build` creates the kinematic bodies, capsules, and constraint anchors in
/// the physics world.
pub struct RagdollBuilder {
    layout: SkeletonLayout,
    bindings: Vec<Option<PartBinding>>,
    settings: RagdollSettings,
    force_mode: ExtraForceMode,
    orient_offset: Quat,
}

impl RagdollBuilder {
    pub fn new(layout: SkeletonLayout) -> Self {
        let count = layout.part_count();
        Self {
            layout,
            bindings: (0..count).map(|_| None).collect(),
            settings: RagdollSettings::default(),
            force_mode: ExtraForceMode::default(),
            orient_offset: Quat::IDENTITY,
        }
    }

    /// Builder for the fixed humanoid rig.
    pub fn humanoid() -> Self {
        Self::new(SkeletonLayout::humanoid())
    }

    /// Supply the binding for one part.
    pub fn bind(mut self, index: usize, binding: PartBinding) -> Self {
        assert!(index < self.bindings.len(), "part index {index} out of range");
        self.bindings[index] = Some(binding);
        self
    }

    pub fn settings(mut self, settings: RagdollSettings) -> Self {
        self.settings = settings;
        self
    }

    /// How per-part extra forces are applied during ragdoll.
    pub fn force_mode(mut self, mode: ExtraForceMode) -> Self {
        self.force_mode = mode;
        self
    }

    /// Rotation from the root part's frame to the character's facing frame.
    /// Used to judge face-up versus face-down when a get-up begins.
    pub fn orient_offset(mut self, offset: Quat) -> Self {
        self.orient_offset = offset;
        self
    }

    /// Create all physics bodies and return the controller. Fails if any
    /// part was left unbound.
    pub fn build(self, physics: &mut PhysicsWorld) -> Result<RagdollController, RagdollError> {
        if self.settings.blend_time < 0.0 {
            return Err(RagdollError::InvalidSettings(
                "blend_time must not be negative".into(),
            ));
        }
        for (i, binding) in self.bindings.iter().enumerate() {
            if binding.is_none() {
                return Err(RagdollError::IncompletePart {
                    index: i,
                    name: self.layout.name(i).to_string(),
                });
            }
        }

        let mut parts = Vec::with_capacity(self.bindings.len());
        for (i, binding) in self.bindings.into_iter().enumerate() {
            let binding = binding.expect("checked above");
            let body = physics.add_kinematic_body(binding.pose);
            let collider =
                physics.add_part_capsule(body, binding.capsule.half_height, binding.capsule.radius);

            // Rest offset in the parent's frame, reproduced when blending
            // back to animation.
            let local_offset = match self.layout.parent(i) {
                Some(p) => {
                    let parent: &BodyPart = &parts[p];
                    parent.transform.inverse_transform_point(binding.pose.position)
                }
                None => Vec3::ZERO,
            };

            let mut part = BodyPart::new(
                i,
                binding.pose,
                local_offset,
                binding.joint_anchor,
                body,
                collider,
            );
            if self.layout.is_constrained(i) && self.settings.use_joints {
                let anchor_point = binding.pose.transform_point(binding.joint_anchor);
                part.anchor_body = Some(physics.add_fixed_anchor(anchor_point));
            }
            parts.push(part);
        }

        log::debug!(
            "ragdoll built: {} parts, {} constrained",
            parts.len(),
            self.layout.constrained().len()
        );
        Ok(RagdollController::new(
            self.layout,
            self.settings,
            parts,
            self.force_mode,
            self.orient_offset,
        ))
    }
}
