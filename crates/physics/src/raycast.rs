//! Raycast queries: hit probing and ground placement.

use crate::collision::CollisionGroup;
use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Vertical lift applied to the probe origin so a root resting exactly on
/// the surface still hits it.
const GROUND_PROBE_LIFT: f32 = 0.01;

/// Longest downward probe when placing a recovered character.
const GROUND_PROBE_RANGE: f32 = 20.0;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        self.raycast_filtered(origin, direction, max_distance, QueryFilter::default())
    }

    /// Cast a ray with an explicit query filter.
    pub fn raycast_filtered(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    /// Probe straight down from a point and return the nearest environment
    /// surface. Ragdoll colliders are excluded so a sprawled limb under the
    /// root does not count as ground.
    pub fn ground_probe(&self, origin: Vec3) -> Option<Vec3> {
        let (env_membership, _) = CollisionGroup::environment();
        let filter = QueryFilter::default()
            .groups(InteractionGroups::new(Group::ALL, env_membership));

        let start = origin + Vec3::Y * GROUND_PROBE_LIFT;
        let hit = self.raycast_filtered(start, -Vec3::Y, GROUND_PROBE_RANGE, filter);
        if hit.is_none() {
            log::trace!("ground probe found no surface below {:?}", origin);
        }
        hit.map(|h| h.point)
    }
}
