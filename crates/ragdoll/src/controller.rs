//! The ragdoll state machine.
//!
//! Owns per-part runtime state and drives transitions between full
//! animation, full simulation, localized hit reactions, and the timed blend
//! back to animation. Transition requests are deferred: they only set flags
//! on the pending queue and execute at the start of the next [`update`]
//! tick, so hooks and gameplay code can request transitions at any point in
//! the frame without reentering the machine.
//!
//! [`update`]: RagdollController::update

use engine_core::{Transform, Vec3};
use glam::Quat;
use physics::{CollisionGroup, ExtraForceMode, PhysicsWorld};

use crate::animation::AnimationPlayer;
use crate::blend;
use crate::body_part::{BodyPart, PartDrive};
use crate::events::{
    HitReactionRequest, RagdollEvent, RagdollHooks, RagdollRequest, RequestQueue,
};
use crate::hit::{self, ReactionOutcome};
use crate::settings::RagdollSettings;
use crate::skeleton::SkeletonLayout;

/// Controller states, ranked from "most ragdolled" to "most animated". The
/// ordering backs the hit-acceptance policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RagdollState {
    /// Physics drives some or all parts.
    Ragdoll = 0,
    /// Blending from the simulated pose back to animation.
    Blend,
    /// Playing the get-up animation.
    GettingUpAnim,
    /// Animation drives every part.
    Animated,
}

/// Ragdoll and hit-reaction manager for one character.
#[derive(Debug)]
pub struct RagdollController {
    layout: SkeletonLayout,
    settings: RagdollSettings,
    parts: Vec<BodyPart>,
    state: RagdollState,
    force_mode: ExtraForceMode,
    orient_offset: Quat,

    full_ragdoll: bool,
    getting_up: bool,
    // Cleared by a localized reaction's auto-blend so the next transition
    // skips the get-up placement.
    getting_up_internal: bool,
    hit_reac_while_getting_up: bool,

    blend_timer: f32,
    event_timer: f32,
    time_end_fired: bool,
    hit_timer: f32,
    reaction_timer: f32,
    reaction_max: f32,
    reaction_underway: bool,
    reaction_auto_blend: bool,
    accept_hit: bool,

    pending: RequestQueue,
    hooks: RagdollHooks,
    events: Vec<RagdollEvent>,

    // Per-tick animated pose scratch, one slot per part.
    animated_pose: Vec<Transform>,
}

impl RagdollController {
    pub(crate) fn new(
        layout: SkeletonLayout,
        settings: RagdollSettings,
        parts: Vec<BodyPart>,
        force_mode: ExtraForceMode,
        orient_offset: Quat,
    ) -> Self {
        let count = parts.len();
        Self {
            layout,
            settings,
            parts,
            state: RagdollState::Animated,
            force_mode,
            orient_offset,
            full_ragdoll: false,
            getting_up: false,
            getting_up_internal: true,
            hit_reac_while_getting_up: false,
            blend_timer: 0.0,
            event_timer: 0.0,
            time_end_fired: false,
            // The first hit under the Timed policy always passes.
            hit_timer: f32::MAX,
            reaction_timer: 0.0,
            reaction_max: 0.0,
            reaction_underway: false,
            reaction_auto_blend: false,
            accept_hit: true,
            pending: RequestQueue::default(),
            hooks: RagdollHooks::default(),
            events: Vec::new(),
            animated_pose: vec![Transform::default(); count],
        }
    }

    /// Current state.
    pub fn state(&self) -> RagdollState {
        self.state
    }

    /// Whether an incoming hit would currently pass the policy gate.
    pub fn accepts_hits(&self) -> bool {
        self.accept_hit
    }

    /// Whether every part is simulated (as opposed to a localized
    /// reaction).
    pub fn is_full_ragdoll(&self) -> bool {
        self.full_ragdoll
    }

    /// Whether the character still owes a get-up after its last full
    /// ragdoll.
    pub fn is_getting_up(&self) -> bool {
        self.getting_up
    }

    /// The skeleton layout this controller was built for.
    pub fn layout(&self) -> &SkeletonLayout {
        &self.layout
    }

    pub fn settings(&self) -> &RagdollSettings {
        &self.settings
    }

    /// Change how long a full ragdoll runs before the timed event fires.
    pub fn set_ragdoll_event_time(&mut self, seconds: f32) {
        self.settings.ragdoll_event_time = seconds;
    }

    pub fn body_part(&self, index: usize) -> &BodyPart {
        assert!(index < self.parts.len(), "part index {index} out of range");
        &self.parts[index]
    }

    pub fn body_part_mut(&mut self, index: usize) -> &mut BodyPart {
        assert!(index < self.parts.len(), "part index {index} out of range");
        &mut self.parts[index]
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Callback slots.
    pub fn hooks_mut(&mut self) -> &mut RagdollHooks {
        &mut self.hooks
    }

    /// Drain the events fired since the last call. Polling alternative to
    /// the hooks.
    pub fn take_events(&mut self) -> Vec<RagdollEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue a full ragdoll for the next tick. `hit_parts` receive
    /// `hit_velocity` while every other part keeps its estimated velocity
    /// or takes `overall_velocity`.
    pub fn request_ragdoll(
        &mut self,
        hit_parts: Option<Vec<usize>>,
        hit_velocity: Option<Vec3>,
        overall_velocity: Option<Vec3>,
        ignore_policy: bool,
    ) {
        if let Some(parts) = &hit_parts {
            self.assert_part_indices(parts);
        }
        self.event_timer = 0.0;
        self.hit_reac_while_getting_up = false;
        self.pending
            .start_ragdoll(hit_parts, hit_velocity, overall_velocity, ignore_policy);
    }

    /// Queue a localized hit reaction for the next tick.
    pub fn request_hit_reaction(
        &mut self,
        hit_parts: Vec<usize>,
        hit_velocity: Vec3,
        ignore_policy: bool,
    ) {
        self.assert_part_indices(&hit_parts);
        self.pending
            .start_hit_reaction(hit_parts, hit_velocity, ignore_policy);
    }

    /// Queue a blend back to animation for the next tick. Clears per-part
    /// extra forces immediately.
    pub fn request_blend_to_animation(&mut self) {
        for part in &mut self.parts {
            part.extra_force = Vec3::ZERO;
        }
        self.pending.blend_to_animation();
    }

    /// Advance the state machine one tick. Call once per frame before
    /// stepping the physics world.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        anim: &mut dyn AnimationPlayer,
        dt: f32,
    ) {
        if dt > 0.0 {
            // Finite-difference velocity of kinematic parts, used as the
            // launch velocity when a ragdoll starts mid-motion.
            for part in &mut self.parts {
                if let Some(t) = physics.body_transform(part.body) {
                    part.custom_velocity = (t.position - part.prev_position) / dt;
                    part.prev_position = t.position;
                }
            }
        }

        self.accept_hit = self.settings.hit_policy.accepts(
            self.state,
            self.hit_timer,
            self.settings.hit_time_interval,
        );
        if dt > 0.0 {
            self.hit_timer += dt;
        }

        // Requests queued last frame, ragdoll first so an escalation wins
        // over a reaction queued the same frame.
        if let Some(req) = self.pending.ragdoll.take() {
            self.start_ragdoll(physics, anim, req);
        }
        if let Some(req) = self.pending.hit_reaction.take() {
            self.start_hit_reaction(physics, anim, req);
        }
        if std::mem::take(&mut self.pending.blend) {
            self.start_transition(physics, anim);
        }

        match self.state {
            RagdollState::Ragdoll => self.update_ragdoll(physics, anim, dt),
            RagdollState::Blend => self.update_transition(physics, anim, dt),
            RagdollState::GettingUpAnim | RagdollState::Animated => {
                self.follow_animation(physics, anim)
            }
        }
    }

    /// Notify the controller that the get-up clip finished. Completes the
    /// round trip back to `Animated`.
    pub fn on_get_up_complete(&mut self, anim: &mut dyn AnimationPlayer) {
        if self.state != RagdollState::GettingUpAnim {
            return;
        }
        self.getting_up = false;
        self.hit_reac_while_getting_up = false;
        anim.set_root_motion(self.settings.root_motion);
        self.state = RagdollState::Animated;
        self.fire(RagdollEvent::GetUp);
        self.fire(RagdollEvent::LastEvent);
    }

    fn assert_part_indices(&self, indices: &[usize]) {
        for &i in indices {
            assert!(
                i < self.parts.len(),
                "hit part index {i} out of range ({} parts)",
                self.parts.len()
            );
        }
    }

    fn start_ragdoll(
        &mut self,
        physics: &mut PhysicsWorld,
        anim: &mut dyn AnimationPlayer,
        req: RagdollRequest,
    ) {
        if !self.accept_hit && !req.ignore_policy {
            log::debug!(
                "ragdoll request dropped by {:?} policy in {:?}",
                self.settings.hit_policy,
                self.state
            );
            return;
        }

        self.enable_full_ragdoll(physics);
        self.hit_reac_while_getting_up = false;
        anim.set_enabled(false);
        self.state = RagdollState::Ragdoll;
        self.full_ragdoll = true;
        self.event_timer = 0.0;
        self.hit_timer = 0.0;
        self.time_end_fired = false;
        self.reaction_underway = false;
        self.reaction_auto_blend = false;

        for part in &self.parts {
            let v = req.overall_velocity.unwrap_or(part.custom_velocity);
            physics.set_linvel(part.body, v);
        }
        if let (Some(hit_parts), Some(hit_velocity)) = (&req.hit_parts, req.hit_velocity) {
            for &i in hit_parts {
                physics.set_linvel(self.parts[i].body, hit_velocity);
            }
        }

        self.getting_up = true;
        self.fire(RagdollEvent::Hit);
    }

    fn start_hit_reaction(
        &mut self,
        physics: &mut PhysicsWorld,
        anim: &mut dyn AnimationPlayer,
        req: HitReactionRequest,
    ) {
        if req.hit_parts.is_empty() {
            log::warn!("hit reaction requested with no hit parts");
            return;
        }
        if !self.accept_hit && !req.ignore_policy {
            log::debug!(
                "hit reaction dropped by {:?} policy in {:?}",
                self.settings.hit_policy,
                self.state
            );
            return;
        }

        // Already simulating: fold the hit into a full ragdoll launch. The
        // gate above already passed, so the escalation must not be gated
        // again.
        if self.state == RagdollState::Ragdoll {
            self.start_ragdoll(
                physics,
                anim,
                RagdollRequest {
                    hit_parts: Some(req.hit_parts),
                    hit_velocity: Some(req.hit_velocity),
                    overall_velocity: None,
                    ignore_policy: true,
                },
            );
            return;
        }

        if self.getting_up {
            self.hit_reac_while_getting_up = true;
        }
        anim.set_enabled(false);
        self.state = RagdollState::Ragdoll;
        self.reaction_timer = 0.0;
        self.hit_timer = 0.0;

        let outcome = hit::evaluate(
            &req.hit_parts,
            req.hit_velocity,
            self.layout.constrained(),
            self.settings.hit_reaction_tolerance,
            self.settings.weight,
            self.settings.hit_resistance,
        );
        match outcome {
            ReactionOutcome::Escalate => {
                self.event_timer = 0.0;
                self.start_ragdoll(
                    physics,
                    anim,
                    RagdollRequest {
                        hit_parts: Some(req.hit_parts),
                        hit_velocity: Some(req.hit_velocity),
                        overall_velocity: None,
                        ignore_policy: true,
                    },
                );
            }
            ReactionOutcome::Partial { duration } => {
                self.reaction_max = duration;
                self.reaction_underway = true;
                self.reaction_auto_blend = true;
                self.blend_timer = 0.0;

                for &i in &req.hit_parts {
                    let part = &mut self.parts[i];
                    physics.set_collider_groups(part.collider, CollisionGroup::ragdoll_active());
                    physics.set_body_dynamic(part.body, false);
                    part.drive = PartDrive::Simulated;
                }
                self.lock_constrained_parts(physics, &req.hit_parts);

                for &i in &req.hit_parts {
                    physics.set_linvel(self.parts[i].body, req.hit_velocity);
                }
                self.fire(RagdollEvent::Hit);
            }
        }
    }

    /// Hold constrained parts that were not hit in place so a localized
    /// reaction cannot drag the character off its feet.
    fn lock_constrained_parts(&mut self, physics: &mut PhysicsWorld, hit_parts: &[usize]) {
        for &c in self.layout.constrained() {
            if hit_parts.contains(&c) {
                continue;
            }
            let part = &mut self.parts[c];
            if self.settings.use_joints {
                if let Some(anchor) = part.anchor_body {
                    let anchor_point = part.transform.transform_point(part.joint_anchor);
                    physics.set_anchor_position(anchor, anchor_point);
                    physics.set_collider_groups(part.collider, CollisionGroup::ragdoll_active());
                    physics.set_body_dynamic(part.body, false);
                    if part.constraint_joint.is_none() {
                        part.constraint_joint =
                            Some(physics.attach_anchor_joint(anchor, part.body, part.joint_anchor));
                    }
                    part.drive = PartDrive::Simulated;
                }
            } else {
                physics.set_body_kinematic(part.body);
                part.drive = PartDrive::Frozen;
            }
        }
    }

    fn start_transition(&mut self, physics: &mut PhysicsWorld, anim: &mut dyn AnimationPlayer) {
        if self.state != RagdollState::Ragdoll {
            return;
        }

        self.disable_ragdoll(physics);
        for part in &mut self.parts {
            part.snapshot_transition();
        }
        self.blend_timer = 0.0;
        self.full_ragdoll = false;
        self.reaction_underway = false;
        self.reaction_auto_blend = false;

        anim.set_enabled(true);
        anim.set_root_motion(true);
        self.state = RagdollState::Blend;

        if self.getting_up && !self.hit_reac_while_getting_up {
            // Root motion fights the get-up placement.
            anim.set_root_motion(false);

            let root = self.parts[0].transform;
            let orient = root.rotation * self.orient_offset;
            let new_root = physics.ground_probe(root.position).unwrap_or(root.position);

            let forward = orient * -Vec3::Z;
            let lying_face_up = forward.y > 0.0;
            if self.getting_up_internal && self.settings.enable_get_up_animation {
                let up = orient * Vec3::Y;
                if lying_face_up {
                    anim.play_get_up(&self.settings.get_up_front_clip);
                    anim.set_facing(Vec3::new(-up.x, 0.0, -up.z));
                } else {
                    anim.play_get_up(&self.settings.get_up_back_clip);
                    anim.set_facing(Vec3::new(up.x, 0.0, up.z));
                }
            }
            anim.warp_root(new_root);
        }
        self.getting_up_internal = true;

        self.fire(RagdollEvent::StartTransition);
    }

    fn update_ragdoll(
        &mut self,
        physics: &mut PhysicsWorld,
        anim: &mut dyn AnimationPlayer,
        dt: f32,
    ) {
        if dt > 0.0 {
            if self.reaction_underway {
                self.reaction_timer += dt;
                if self.reaction_timer >= self.reaction_max {
                    self.reaction_underway = false;
                    if self.reaction_auto_blend {
                        self.reaction_auto_blend = false;
                        self.getting_up_internal = false;
                        self.pending.blend_to_animation();
                    }
                }
            } else if self.full_ragdoll {
                self.event_timer += dt;
                if self.event_timer >= self.settings.ragdoll_event_time && !self.time_end_fired {
                    self.time_end_fired = true;
                    self.fire(RagdollEvent::TimeEnd);
                }
            }
        }

        for i in 0..self.parts.len() {
            match self.parts[i].drive {
                PartDrive::Simulated => {
                    let force = self.parts[i].extra_force;
                    physics.apply_extra_force(self.parts[i].body, force, self.force_mode);
                    if let Some(t) = physics.body_transform(self.parts[i].body) {
                        self.parts[i].transform = t;
                    }
                }
                PartDrive::Animated => {
                    let pose = anim.sample_pose(i);
                    self.parts[i].transform = pose;
                    physics.set_kinematic_pose(self.parts[i].body, pose);
                }
                PartDrive::Frozen => {}
            }
        }
    }

    fn update_transition(
        &mut self,
        physics: &mut PhysicsWorld,
        anim: &mut dyn AnimationPlayer,
        dt: f32,
    ) {
        if dt <= 0.0 {
            return;
        }
        self.blend_timer += dt;
        let amount = blend::blend_amount(self.blend_timer, self.settings.blend_time);

        for i in 0..self.parts.len() {
            self.animated_pose[i] = anim.sample_pose(i);
        }

        let root = blend::blend_root(
            self.parts[0].transition_position,
            self.parts[0].transition_rotation,
            &self.animated_pose[0],
            amount,
        );
        self.parts[0].transform = root;
        physics.set_kinematic_pose(self.parts[0].body, root);

        // Root-first ordering guarantees the parent is already blended.
        for i in 1..self.parts.len() {
            let parent = self.layout.parent(i).expect("non-root part has a parent");
            let parent_pose = self.parts[parent].transform;
            let pose = blend::blend_limb(
                self.parts[i].transform.position,
                self.parts[i].transition_rotation,
                self.animated_pose[i].rotation,
                &parent_pose,
                self.parts[i].local_offset,
                amount,
            );
            self.parts[i].transform = pose;
            physics.set_kinematic_pose(self.parts[i].body, pose);
        }

        if self.blend_timer >= self.settings.blend_time {
            anim.set_root_motion(self.settings.root_motion);
            if self.getting_up && self.settings.enable_get_up_animation {
                self.state = RagdollState::GettingUpAnim;
            } else {
                self.getting_up = false;
                self.hit_reac_while_getting_up = false;
                self.state = RagdollState::Animated;
                self.fire(RagdollEvent::LastEvent);
            }
            self.fire(RagdollEvent::BlendEnd);
        }
    }

    fn follow_animation(&mut self, physics: &mut PhysicsWorld, anim: &mut dyn AnimationPlayer) {
        for part in &mut self.parts {
            let pose = anim.sample_pose(part.index);
            part.transform = pose;
            physics.set_kinematic_pose(part.body, pose);
        }
    }

    /// Put every part under physics control with gravity and live
    /// collisions. Any constraint joints from a prior reaction come off.
    fn enable_full_ragdoll(&mut self, physics: &mut PhysicsWorld) {
        for part in &mut self.parts {
            if let Some(joint) = part.constraint_joint.take() {
                physics.remove_joint(joint);
            }
            physics.set_collider_groups(part.collider, CollisionGroup::ragdoll_active());
            physics.set_body_dynamic(part.body, true);
            part.drive = PartDrive::Simulated;
        }
        self.blend_timer = 0.0;
    }

    /// Return every part to kinematic animation following.
    fn disable_ragdoll(&mut self, physics: &mut PhysicsWorld) {
        for part in &mut self.parts {
            if let Some(joint) = part.constraint_joint.take() {
                physics.remove_joint(joint);
            }
            physics.set_collider_groups(part.collider, CollisionGroup::ragdoll_inactive());
            physics.set_body_kinematic(part.body);
            part.drive = PartDrive::Animated;
        }
    }

    fn fire(&mut self, event: RagdollEvent) {
        log::trace!("ragdoll event {:?} in {:?}", event, self.state);
        self.events.push(event);
        // The hook is taken out of its slot for the call so it can borrow
        // the queue while the controller is borrowed.
        let mut hook = self.hooks.slot(event).take();
        if let Some(h) = hook.as_mut() {
            h(&mut self.pending);
        }
        let slot = self.hooks.slot(event);
        if slot.is_none() {
            *slot = hook;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Capsule, PartBinding, RagdollBuilder};
    use crate::policy::HitPolicy;
    use crate::skeleton::{HumanBodyPart, HUMANOID_PART_COUNT};

    struct ScriptedAnim {
        poses: Vec<Transform>,
        enabled: bool,
        root_motion: bool,
        played: Vec<String>,
        root_warp: Option<Vec3>,
        facing: Option<Vec3>,
    }

    impl ScriptedAnim {
        fn standing() -> Self {
            Self {
                poses: standing_poses(),
                enabled: true,
                root_motion: true,
                played: Vec::new(),
                root_warp: None,
                facing: None,
            }
        }
    }

    impl AnimationPlayer for ScriptedAnim {
        fn sample_pose(&self, part: usize) -> Transform {
            self.poses[part]
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
        fn set_root_motion(&mut self, enabled: bool) {
            self.root_motion = enabled;
        }
        fn play_get_up(&mut self, clip_name: &str) {
            self.played.push(clip_name.to_string());
        }
        fn warp_root(&mut self, position: Vec3) {
            self.root_warp = Some(position);
        }
        fn set_facing(&mut self, forward: Vec3) {
            self.facing = Some(forward);
        }
    }

    fn standing_poses() -> Vec<Transform> {
        (0..HUMANOID_PART_COUNT)
            .map(|i| Transform::from_position(Vec3::new(0.0, 1.2 - 0.1 * i as f32, 0.0)))
            .collect()
    }

    fn build(settings: RagdollSettings) -> (PhysicsWorld, RagdollController) {
        let mut physics = PhysicsWorld::new();
        physics.add_ground_plane();
        let poses = standing_poses();
        let mut builder = RagdollBuilder::humanoid().settings(settings);
        for (i, pose) in poses.iter().enumerate() {
            builder = builder.bind(
                i,
                PartBinding::new(
                    *pose,
                    Capsule {
                        half_height: 0.12,
                        radius: 0.06,
                    },
                )
                .with_joint_anchor(Vec3::new(0.0, -0.2, 0.0)),
            );
        }
        let controller = builder.build(&mut physics).unwrap();
        physics.update_query_pipeline();
        (physics, controller)
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn starts_animated_and_follows_poses() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.state(), RagdollState::Animated);
        assert!(controller.accepts_hits());
        let head = HumanBodyPart::Head.index();
        assert_eq!(
            controller.body_part(head).transform.position,
            anim.poses[head].position
        );
        assert!(controller.take_events().is_empty());
    }

    #[test]
    fn full_ragdoll_round_trip_with_get_up() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_ragdoll(None, None, Some(Vec3::new(0.0, 0.0, -3.0)), false);
        // Request is deferred until the next tick.
        assert_eq!(controller.state(), RagdollState::Animated);
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.state(), RagdollState::Ragdoll);
        assert!(controller.is_full_ragdoll());
        assert!(controller.is_getting_up());
        assert!(!anim.enabled);
        assert_eq!(controller.take_events(), vec![RagdollEvent::Hit]);

        controller.request_blend_to_animation();
        controller.update(&mut physics, &mut anim, 0.1);
        assert_eq!(controller.state(), RagdollState::Blend);
        assert!(anim.enabled);
        // Root motion stays off while the get-up placement is in charge.
        assert!(!anim.root_motion);
        assert_eq!(anim.played.len(), 1);
        assert!(anim.root_warp.is_some());
        assert!(anim.facing.is_some());
        assert_eq!(controller.take_events(), vec![RagdollEvent::StartTransition]);

        // Past the 0.4 s blend time.
        controller.update(&mut physics, &mut anim, 0.5);
        assert_eq!(controller.state(), RagdollState::GettingUpAnim);
        assert_eq!(controller.take_events(), vec![RagdollEvent::BlendEnd]);

        controller.on_get_up_complete(&mut anim);
        assert_eq!(controller.state(), RagdollState::Animated);
        assert!(!controller.is_getting_up());
        assert!(anim.root_motion);
        assert_eq!(
            controller.take_events(),
            vec![RagdollEvent::GetUp, RagdollEvent::LastEvent]
        );
    }

    #[test]
    fn blend_without_get_up_goes_straight_to_animated() {
        let settings = RagdollSettings {
            enable_get_up_animation: false,
            ..Default::default()
        };
        let (mut physics, mut controller) = build(settings);
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_ragdoll(None, None, None, false);
        controller.update(&mut physics, &mut anim, DT);
        controller.request_blend_to_animation();
        controller.update(&mut physics, &mut anim, DT);
        controller.update(&mut physics, &mut anim, 1.0);

        assert_eq!(controller.state(), RagdollState::Animated);
        assert!(!controller.is_getting_up());
        assert!(anim.played.is_empty());
        let events = controller.take_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == RagdollEvent::LastEvent)
                .count(),
            1
        );
    }

    #[test]
    fn policy_gate_drops_request_without_ignore() {
        let settings = RagdollSettings {
            hit_policy: HitPolicy::OnAnimated,
            ..Default::default()
        };
        let (mut physics, mut controller) = build(settings);
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_ragdoll(None, None, None, false);
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.state(), RagdollState::Ragdoll);
        controller.take_events();

        // In Ragdoll the OnAnimated policy rejects; the request is a no-op.
        controller.request_hit_reaction(vec![2], Vec3::new(0.0, 0.0, 2.0), false);
        controller.update(&mut physics, &mut anim, DT);
        assert!(controller.take_events().is_empty());
        assert!(!controller.accepts_hits());

        // ignore_policy bypasses the gate.
        controller.request_hit_reaction(vec![2], Vec3::new(0.0, 0.0, 2.0), true);
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.take_events(), vec![RagdollEvent::Hit]);
    }

    #[test]
    fn timed_policy_enforces_interval() {
        let settings = RagdollSettings {
            hit_policy: HitPolicy::Timed,
            hit_time_interval: 0.25,
            ..Default::default()
        };
        let (mut physics, mut controller) = build(settings);
        let mut anim = ScriptedAnim::standing();

        // First hit always passes.
        controller.request_ragdoll(None, None, None, false);
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.take_events(), vec![RagdollEvent::Hit]);

        // Too soon after the last accepted hit.
        controller.request_ragdoll(None, None, None, false);
        controller.update(&mut physics, &mut anim, 0.1);
        assert!(controller.take_events().is_empty());

        // After the interval elapses the next request passes.
        controller.update(&mut physics, &mut anim, 0.3);
        controller.request_ragdoll(None, None, None, false);
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.take_events(), vec![RagdollEvent::Hit]);
    }

    #[test]
    fn strong_hit_escalates_to_full_ragdoll() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        // Magnitude 25 exceeds the default tolerance of 20.
        controller.request_hit_reaction(
            vec![HumanBodyPart::Chest.index()],
            Vec3::new(0.0, 0.0, 25.0),
            false,
        );
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.state(), RagdollState::Ragdoll);
        assert!(controller.is_full_ragdoll());
        assert_eq!(controller.take_events(), vec![RagdollEvent::Hit]);
    }

    #[test]
    fn swoop_hit_on_both_knees_escalates() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_hit_reaction(
            vec![
                HumanBodyPart::LeftKnee.index(),
                HumanBodyPart::RightKnee.index(),
            ],
            Vec3::new(2.0, 0.0, 0.0),
            false,
        );
        controller.update(&mut physics, &mut anim, DT);
        assert!(controller.is_full_ragdoll());
    }

    #[test]
    fn weak_hit_runs_partial_reaction_and_auto_blends() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        let head = HumanBodyPart::Head.index();
        // |v| = 5 with default weight and resistance: 5 / 256 s reaction.
        controller.request_hit_reaction(vec![head], Vec3::new(0.0, 0.0, 5.0), false);
        controller.update(&mut physics, &mut anim, 0.01);
        assert_eq!(controller.state(), RagdollState::Ragdoll);
        assert!(!controller.is_full_ragdoll());
        assert_eq!(controller.take_events(), vec![RagdollEvent::Hit]);

        // Hit part simulated, knees locked with joints, rest animated.
        assert_eq!(controller.body_part(head).drive, PartDrive::Simulated);
        let knee = HumanBodyPart::LeftKnee.index();
        assert_eq!(controller.body_part(knee).drive, PartDrive::Simulated);
        assert!(controller.body_part(knee).constraint_joint.is_some());
        assert_eq!(
            controller.body_part(HumanBodyPart::Spine.index()).drive,
            PartDrive::Animated
        );

        // Reaction expires after ~0.0195 s and queues the blend itself.
        controller.update(&mut physics, &mut anim, 0.02);
        controller.update(&mut physics, &mut anim, 0.01);
        assert_eq!(controller.state(), RagdollState::Blend);
        assert!(controller.body_part(knee).constraint_joint.is_none());

        controller.update(&mut physics, &mut anim, 1.0);
        assert_eq!(controller.state(), RagdollState::Animated);
        // No get-up for a localized reaction.
        assert!(anim.played.is_empty());
        let events = controller.take_events();
        assert!(events.contains(&RagdollEvent::LastEvent));
    }

    #[test]
    fn frozen_knees_when_joints_disabled() {
        let settings = RagdollSettings {
            use_joints: false,
            ..Default::default()
        };
        let (mut physics, mut controller) = build(settings);
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_hit_reaction(
            vec![HumanBodyPart::Head.index()],
            Vec3::new(0.0, 0.0, 5.0),
            false,
        );
        controller.update(&mut physics, &mut anim, 0.01);
        let knee = HumanBodyPart::LeftKnee.index();
        assert_eq!(controller.body_part(knee).drive, PartDrive::Frozen);
        assert!(controller.body_part(knee).constraint_joint.is_none());
    }

    #[test]
    fn time_end_fires_once_and_hook_can_queue_blend() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        controller.set_ragdoll_event_time(0.05);
        controller.hooks_mut().on_time_end = Some(Box::new(|queue| {
            queue.blend_to_animation();
        }));
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_ragdoll(None, None, None, false);
        controller.update(&mut physics, &mut anim, DT);
        controller.take_events();

        controller.update(&mut physics, &mut anim, 0.1);
        assert_eq!(controller.take_events(), vec![RagdollEvent::TimeEnd]);

        // The hook's queued blend executes on the following tick, and the
        // timed event does not repeat.
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.state(), RagdollState::Blend);
        let events = controller.take_events();
        assert!(!events.contains(&RagdollEvent::TimeEnd));
    }

    #[test]
    fn blend_request_outside_ragdoll_is_ignored() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_blend_to_animation();
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.state(), RagdollState::Animated);
        assert!(controller.take_events().is_empty());
    }

    #[test]
    fn hit_during_get_up_skips_recovery_on_next_blend() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        // Knock down, blend, reach the get-up clip.
        controller.request_ragdoll(None, None, None, false);
        controller.update(&mut physics, &mut anim, DT);
        controller.request_blend_to_animation();
        controller.update(&mut physics, &mut anim, DT);
        controller.update(&mut physics, &mut anim, 0.5);
        assert_eq!(controller.state(), RagdollState::GettingUpAnim);
        anim.played.clear();

        // Re-hit while the clip plays, then blend again: no new clip.
        controller.request_hit_reaction(
            vec![HumanBodyPart::Chest.index()],
            Vec3::new(0.0, 0.0, 5.0),
            false,
        );
        controller.update(&mut physics, &mut anim, 0.01);
        assert_eq!(controller.state(), RagdollState::Ragdoll);
        controller.request_blend_to_animation();
        controller.update(&mut physics, &mut anim, DT);
        assert_eq!(controller.state(), RagdollState::Blend);
        assert!(anim.played.is_empty());
    }

    #[test]
    fn extra_force_feeds_simulated_parts() {
        let (mut physics, mut controller) = build(RagdollSettings::default());
        let mut anim = ScriptedAnim::standing();
        controller.update(&mut physics, &mut anim, DT);

        controller.request_ragdoll(None, None, Some(Vec3::ZERO), false);
        controller.update(&mut physics, &mut anim, DT);

        let head = HumanBodyPart::Head.index();
        controller.body_part_mut(head).extra_force = Vec3::new(0.0, 4.0, 0.0);
        let before = physics.linvel(controller.body_part(head).body).unwrap();
        controller.update(&mut physics, &mut anim, DT);
        let after = physics.linvel(controller.body_part(head).body).unwrap();
        // Default mode is a direct velocity change.
        assert!((after - before - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-4);
    }
}
