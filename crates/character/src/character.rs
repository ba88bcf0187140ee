//! The simplest ragdoll user: owns a controller, locks movement while
//! knocked down, and blends back automatically when the ragdoll timer runs
//! out.

use engine_core::Vec3;
use physics::PhysicsWorld;
use ragdoll::{AnimationPlayer, RagdollController, RagdollEvent, RagdollState};

use crate::ragdoll_user::RagdollUser;

/// How long a character lies in full ragdoll before blending back on its
/// own.
const AUTO_BLEND_AFTER: f32 = 3.0;

/// A character wired to its ragdoll controller with the standard hook
/// chain: the timed event queues the blend back, a hit locks movement, and
/// the final event releases it.
pub struct CharacterAdapter {
    controller: RagdollController,
    ignore_hit: bool,
    movement_locked: bool,
}

impl CharacterAdapter {
    pub fn new(mut controller: RagdollController) -> Self {
        controller.set_ragdoll_event_time(AUTO_BLEND_AFTER);
        controller.hooks_mut().on_time_end = Some(Box::new(|queue| {
            queue.blend_to_animation();
        }));
        Self {
            controller,
            ignore_hit: false,
            movement_locked: false,
        }
    }

    /// Tick the controller and react to what it fired this frame.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        anim: &mut dyn AnimationPlayer,
        dt: f32,
    ) {
        self.controller.update(physics, anim, dt);
        for event in self.controller.take_events() {
            match event {
                RagdollEvent::Hit => self.movement_locked = true,
                RagdollEvent::GetUp | RagdollEvent::LastEvent => self.movement_locked = false,
                _ => {}
            }
        }
    }

    /// Forward get-up clip completion to the controller.
    pub fn on_get_up_complete(&mut self, anim: &mut dyn AnimationPlayer) {
        self.controller.on_get_up_complete(anim);
    }

    /// Whether gameplay movement is currently allowed.
    pub fn can_move(&self) -> bool {
        !self.movement_locked && self.controller.state() == RagdollState::Animated
    }
}

impl RagdollUser for CharacterAdapter {
    fn controller(&self) -> &RagdollController {
        &self.controller
    }

    fn controller_mut(&mut self) -> &mut RagdollController {
        &mut self.controller
    }

    fn ignore_hit(&self) -> bool {
        self.ignore_hit
    }

    fn set_ignore_hit(&mut self, ignore: bool) {
        self.ignore_hit = ignore;
    }
}
