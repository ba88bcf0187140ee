//! Headless demo: one humanoid gets clipped by a weak hit, then knocked
//! flat, and works its way back to animation. State changes and events go
//! to the log.

use anyhow::Result;
use character::{CharacterAdapter, RagdollUser};
use engine_core::{Time, Transform, Vec3};
use physics::PhysicsWorld;
use ragdoll::{
    AnimationPlayer, Capsule, HumanBodyPart, PartBinding, RagdollBuilder, RagdollSettings,
    RagdollState, HUMANOID_PART_COUNT,
};

/// How long the fake get-up clip runs before reporting completion.
const GET_UP_CLIP_LENGTH: f32 = 1.5;

/// Stand-in animation source: a static standing pose with a slight sway so
/// kinematic velocity estimation has something to measure.
struct DemoAnim {
    rest: Vec<Transform>,
    root: Vec3,
    sway_phase: f32,
    enabled: bool,
}

impl DemoAnim {
    fn new() -> Self {
        Self {
            rest: standing_rest_pose(),
            root: Vec3::ZERO,
            sway_phase: 0.0,
            enabled: true,
        }
    }

    fn advance(&mut self, dt: f32) {
        if self.enabled {
            self.sway_phase += dt;
        }
    }
}

impl AnimationPlayer for DemoAnim {
    fn sample_pose(&self, part: usize) -> Transform {
        let mut pose = self.rest[part];
        pose.position += self.root;
        pose.position.x += 0.02 * self.sway_phase.sin();
        pose
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_root_motion(&mut self, enabled: bool) {
        log::debug!("animation: root motion {enabled}");
    }

    fn play_get_up(&mut self, clip_name: &str) {
        log::info!("animation: playing {clip_name}");
    }

    fn warp_root(&mut self, position: Vec3) {
        log::info!("animation: root warped to {position:?}");
        self.root = position - self.rest[0].position;
    }

    fn set_facing(&mut self, forward: Vec3) {
        log::info!("animation: facing {forward:?}");
    }
}

fn standing_rest_pose() -> Vec<Transform> {
    // Rough proportions of a 1.8 m figure, spine root at hip height.
    let p = |x: f32, y: f32| Transform::from_position(Vec3::new(x, y, 0.0));
    vec![
        p(0.0, 1.0),    // spine
        p(0.0, 1.3),    // chest
        p(0.0, 1.65),   // head
        p(-0.25, 1.4),  // left shoulder
        p(0.25, 1.4),   // right shoulder
        p(-0.3, 1.1),   // left elbow
        p(0.3, 1.1),    // right elbow
        p(-0.12, 0.8),  // left hip
        p(0.12, 0.8),   // right hip
        p(-0.12, 0.4),  // left knee
        p(0.12, 0.4),   // right knee
    ]
}

fn build_character(physics: &mut PhysicsWorld) -> Result<CharacterAdapter> {
    let settings = RagdollSettings::load("ragdoll.ron");
    let mut builder = RagdollBuilder::humanoid().settings(settings);
    for (i, pose) in standing_rest_pose().iter().enumerate() {
        debug_assert!(i < HUMANOID_PART_COUNT);
        builder = builder.bind(
            i,
            PartBinding::new(
                *pose,
                Capsule {
                    half_height: 0.12,
                    radius: 0.07,
                },
            )
            .with_joint_anchor(Vec3::new(0.0, -0.3, 0.0)),
        );
    }
    let controller = builder.build(physics)?;
    Ok(CharacterAdapter::new(controller))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut physics = PhysicsWorld::new();
    physics.add_ground_plane();
    // A low platform behind the character so the ragdoll has something to
    // sprawl against.
    physics.add_static_box(Vec3::new(0.0, 0.15, -1.5), Vec3::new(1.0, 0.15, 0.5));
    let mut character = build_character(&mut physics)?;
    let mut anim = DemoAnim::new();

    let mut time = Time::new();
    let dt = time.fixed_timestep_seconds();

    let mut sim_time = 0.0f32;
    let mut weak_hit_sent = false;
    let mut knockdown_sent = false;
    let mut clip_time = 0.0f32;
    let mut last_state = character.controller().state();

    log::info!("demo start: weak hit at 1 s, knockdown at 3 s");

    while sim_time < 12.0 {
        time.update();
        while time.should_fixed_update() {
            sim_time += dt;

            if sim_time >= 1.0 && !weak_hit_sent {
                weak_hit_sent = true;
                log::info!("weak hit to the head");
                character.start_hit_reaction(
                    vec![HumanBodyPart::Head.index()],
                    Vec3::new(0.0, 0.0, 6.0),
                );
            }
            if sim_time >= 3.0 && !knockdown_sent {
                knockdown_sent = true;
                log::info!("knockdown");
                character.start_ragdoll(
                    Some(vec![HumanBodyPart::Chest.index()]),
                    Some(Vec3::new(0.0, 2.0, -8.0)),
                    Some(Vec3::new(0.0, 0.0, -3.0)),
                );
            }

            anim.advance(dt);
            character.update(&mut physics, &mut anim, dt);
            physics.step();
            physics.update_query_pipeline();

            let state = character.controller().state();
            if state != last_state {
                log::info!("state: {last_state:?} -> {state:?} (t = {sim_time:.2} s)");
                last_state = state;
            }

            if state == RagdollState::GettingUpAnim {
                clip_time += dt;
                if clip_time >= GET_UP_CLIP_LENGTH {
                    character.on_get_up_complete(&mut anim);
                    clip_time = 0.0;
                }
            }
        }

        // All timing comes from the fixed-step accumulator; yield between
        // frames instead of spinning.
        std::thread::sleep(std::time::Duration::from_millis(2));

        if knockdown_sent && sim_time > 8.0 && character.can_move() {
            break;
        }
    }

    log::info!(
        "demo end: state {:?}, can_move {}",
        character.controller().state(),
        character.can_move()
    );
    Ok(())
}
