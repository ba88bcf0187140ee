//! Physics world management with Rapier3D.

use crate::collision::{interaction_groups, CollisionGroup};
use engine_core::{Transform, Vec3};
use glam::Quat;
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;

/// How a body part's extra force is fed to the solver each ragdoll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraForceMode {
    /// Continuous force, mass-dependent.
    Force,
    /// One-shot impulse, mass-dependent.
    Impulse,
    /// Direct velocity increment, mass-independent.
    #[default]
    VelocityChange,
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for raycasting.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a kinematic rigid body at the given pose. Ragdoll parts start
    /// kinematic; animation drives them until a ragdoll begins.
    pub fn add_kinematic_body(&mut self, pose: Transform) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![pose.position.x, pose.position.y, pose.position.z])
            .rotation(rotvec(pose.rotation))
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a fixed body with no collider, used as the world-space anchor
    /// end of a constraint joint.
    pub fn add_fixed_anchor(&mut self, position: Vec3) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y, position.z])
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a capsule collider shaped for a body part.
    pub fn add_part_capsule(
        &mut self,
        body_handle: RigidBodyHandle,
        half_height: f32,
        radius: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .friction(0.8)
            .restitution(0.2)
            .density(1.2)
            .collision_groups(interaction_groups(CollisionGroup::ragdoll_inactive()))
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(interaction_groups(CollisionGroup::environment()))
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a static environment box (platforms, obstacles in test scenes).
    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![center.x, center.y, center.z])
            .collision_groups(interaction_groups(CollisionGroup::environment()))
            .build();
        self.collider_set.insert(collider)
    }

    /// Switch a body to dynamic simulation, optionally without gravity.
    /// Partial hit reactions run gravity-free so unhit limbs sag less.
    pub fn set_body_dynamic(&mut self, handle: RigidBodyHandle, gravity: bool) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_body_type(RigidBodyType::Dynamic, true);
            body.set_gravity_scale(if gravity { 1.0 } else { 0.0 }, true);
        }
    }

    /// Switch a body back to kinematic (animation-driven) mode.
    pub fn set_body_kinematic(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_body_type(RigidBodyType::KinematicPositionBased, true);
        }
    }

    /// Set the collision groups of a collider.
    pub fn set_collider_groups(&mut self, handle: ColliderHandle, pair: (Group, Group)) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_collision_groups(interaction_groups(pair));
        }
    }

    /// Drive a kinematic body toward a pose for the next step.
    pub fn set_kinematic_pose(&mut self, handle: RigidBodyHandle, pose: Transform) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_next_kinematic_translation(vector![
                pose.position.x,
                pose.position.y,
                pose.position.z
            ]);
            body.set_next_kinematic_rotation(unit_quat(pose.rotation));
        }
    }

    /// Teleport a body to a pose immediately, bypassing interpolation.
    pub fn teleport_body(&mut self, handle: RigidBodyHandle, pose: Transform) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(
                vector![pose.position.x, pose.position.y, pose.position.z],
                true,
            );
            body.set_rotation(unit_quat(pose.rotation), true);
        }
    }

    /// Get a body's linear velocity.
    pub fn linvel(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| {
                let v = body.linvel();
                Vec3::new(v.x, v.y, v.z)
            })
    }

    /// Set a body's linear velocity.
    pub fn set_linvel(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    /// Feed an extra force into a body using the chosen mode. Called once
    /// per ragdoll tick per part.
    pub fn apply_extra_force(&mut self, handle: RigidBodyHandle, force: Vec3, mode: ExtraForceMode) {
        if force == Vec3::ZERO {
            return;
        }
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let v = vector![force.x, force.y, force.z];
            match mode {
                ExtraForceMode::Force => {
                    body.reset_forces(true);
                    body.add_force(v, true);
                }
                ExtraForceMode::Impulse => body.apply_impulse(v, true),
                ExtraForceMode::VelocityChange => {
                    let new_vel = body.linvel() + v;
                    body.set_linvel(new_vel, true);
                }
            }
        }
    }

    /// Pin a body to a world anchor with a ball joint. The joint locks the
    /// anchor point's translation while leaving rotation free, so the limb
    /// can pivot but not drift.
    pub fn attach_anchor_joint(
        &mut self,
        anchor_body: RigidBodyHandle,
        part_body: RigidBodyHandle,
        local_anchor: Vec3,
    ) -> ImpulseJointHandle {
        let joint = SphericalJointBuilder::new()
            .local_anchor1(point![0.0, 0.0, 0.0])
            .local_anchor2(point![local_anchor.x, local_anchor.y, local_anchor.z])
            .build();
        self.impulse_joint_set
            .insert(anchor_body, part_body, joint, true)
    }

    /// Remove an impulse joint.
    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.impulse_joint_set.remove(handle, true);
    }

    /// Move a fixed anchor body to a new world position.
    pub fn set_anchor_position(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(vector![position.x, position.y, position.z], true);
        }
    }

    /// Get the transform of a rigid body.
    pub fn body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            let rot = body.rotation();
            Transform {
                position: Vec3::new(pos.x, pos.y, pos.z),
                rotation: Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
                scale: Vec3::ONE,
            }
        })
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

fn unit_quat(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(rapier3d::na::Quaternion::new(q.w, q.x, q.y, q.z))
}

fn rotvec(q: Quat) -> AngVector<Real> {
    let (axis, angle) = q.to_axis_angle();
    vector![axis.x * angle, axis.y * angle, axis.z * angle]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_body_starts_at_pose() {
        let mut world = PhysicsWorld::new();
        let pose = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let handle = world.add_kinematic_body(pose);
        let t = world.body_transform(handle).unwrap();
        assert!((t.position - pose.position).length() < 1e-5);
    }

    #[test]
    fn velocity_change_adds_to_linvel() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_kinematic_body(Transform::default());
        world.set_body_dynamic(handle, true);
        world.set_linvel(handle, Vec3::new(1.0, 0.0, 0.0));
        world.apply_extra_force(handle, Vec3::new(0.0, 2.0, 0.0), ExtraForceMode::VelocityChange);
        let v = world.linvel(handle).unwrap();
        assert!((v - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn anchor_joint_attach_and_remove() {
        let mut world = PhysicsWorld::new();
        let part = world.add_kinematic_body(Transform::default());
        world.set_body_dynamic(part, true);
        let anchor = world.add_fixed_anchor(Vec3::new(0.0, 1.0, 0.0));
        let joint = world.attach_anchor_joint(anchor, part, Vec3::new(0.0, -0.2, 0.0));
        assert!(world.impulse_joint_set.get(joint).is_some());
        world.remove_joint(joint);
        assert!(world.impulse_joint_set.get(joint).is_none());
    }
}
