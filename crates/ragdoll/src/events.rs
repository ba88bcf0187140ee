//! Controller events, callback hooks, and the deferred request queue.
//!
//! Requests raised during a frame (including from inside a hook) are only
//! flags on [`RequestQueue`]; the controller executes them at the start of
//! its next tick. Hooks therefore never reenter the state machine.

use engine_core::Vec3;

/// Notification points fired by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RagdollEvent {
    /// A ragdoll or hit reaction actually started.
    Hit,
    /// Transition from ragdoll back toward animation began.
    StartTransition,
    /// Ragdoll-duration timer elapsed while fully ragdolled.
    TimeEnd,
    /// Blend phase completed.
    BlendEnd,
    /// Get-up animation finished.
    GetUp,
    /// The controller came to rest in the `Animated` state.
    LastEvent,
}

/// A queued full-ragdoll request.
#[derive(Debug, Clone, Default)]
pub struct RagdollRequest {
    pub hit_parts: Option<Vec<usize>>,
    pub hit_velocity: Option<Vec3>,
    pub overall_velocity: Option<Vec3>,
    pub ignore_policy: bool,
}

/// A queued localized hit-reaction request.
#[derive(Debug, Clone)]
pub struct HitReactionRequest {
    pub hit_parts: Vec<usize>,
    pub hit_velocity: Vec3,
    pub ignore_policy: bool,
}

/// Pending transition requests, executed in ragdoll / hit-reaction / blend
/// order at the start of the next tick. A newer request of the same kind
/// overwrites an unexecuted one.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pub(crate) ragdoll: Option<RagdollRequest>,
    pub(crate) hit_reaction: Option<HitReactionRequest>,
    pub(crate) blend: bool,
}

impl RequestQueue {
    /// Queue a full-ragdoll transition.
    pub fn start_ragdoll(
        &mut self,
        hit_parts: Option<Vec<usize>>,
        hit_velocity: Option<Vec3>,
        overall_velocity: Option<Vec3>,
        ignore_policy: bool,
    ) {
        self.ragdoll = Some(RagdollRequest {
            hit_parts,
            hit_velocity,
            overall_velocity,
            ignore_policy,
        });
    }

    /// Queue a localized hit reaction.
    pub fn start_hit_reaction(
        &mut self,
        hit_parts: Vec<usize>,
        hit_velocity: Vec3,
        ignore_policy: bool,
    ) {
        self.hit_reaction = Some(HitReactionRequest {
            hit_parts,
            hit_velocity,
            ignore_policy,
        });
    }

    /// Queue a blend back to animation.
    pub fn blend_to_animation(&mut self) {
        self.blend = true;
    }

    /// Whether anything is queued.
    pub fn is_empty(&self) -> bool {
        self.ragdoll.is_none() && self.hit_reaction.is_none() && !self.blend
    }
}

/// A user callback. Receives the request queue so it may schedule the next
/// transition.
pub type Hook = Box<dyn FnMut(&mut RequestQueue)>;

/// The six per-instance callback slots.
#[derive(Default)]
pub struct RagdollHooks {
    pub on_hit: Option<Hook>,
    pub on_start_transition: Option<Hook>,
    pub last_event: Option<Hook>,
    pub on_time_end: Option<Hook>,
    pub on_get_up: Option<Hook>,
    pub on_blend_end: Option<Hook>,
}

impl RagdollHooks {
    pub(crate) fn slot(&mut self, event: RagdollEvent) -> &mut Option<Hook> {
        match event {
            RagdollEvent::Hit => &mut self.on_hit,
            RagdollEvent::StartTransition => &mut self.on_start_transition,
            RagdollEvent::TimeEnd => &mut self.on_time_end,
            RagdollEvent::BlendEnd => &mut self.on_blend_end,
            RagdollEvent::GetUp => &mut self.on_get_up,
            RagdollEvent::LastEvent => &mut self.last_event,
        }
    }
}

impl std::fmt::Debug for RagdollHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagdollHooks")
            .field("on_hit", &self.on_hit.is_some())
            .field("on_start_transition", &self.on_start_transition.is_some())
            .field("last_event", &self.last_event.is_some())
            .field("on_time_end", &self.on_time_end.is_some())
            .field("on_get_up", &self.on_get_up.is_some())
            .field("on_blend_end", &self.on_blend_end.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_overwrites_same_kind() {
        let mut q = RequestQueue::default();
        q.start_hit_reaction(vec![1], Vec3::X, false);
        q.start_hit_reaction(vec![2], Vec3::Y, true);
        let req = q.hit_reaction.as_ref().unwrap();
        assert_eq!(req.hit_parts, vec![2]);
        assert!(req.ignore_policy);
    }

    #[test]
    fn queue_empty_tracking() {
        let mut q = RequestQueue::default();
        assert!(q.is_empty());
        q.blend_to_animation();
        assert!(!q.is_empty());
    }
}
