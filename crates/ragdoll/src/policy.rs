//! Hit-acceptance policy: when does an incoming hit request get honored.

use crate::controller::RagdollState;
use serde::{Deserialize, Serialize};

/// Gate for incoming hit and ragdoll requests, ranked against the state
/// ordering `Ragdoll < Blend < GettingUpAnim < Animated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitPolicy {
    /// Always accept hits.
    #[default]
    Always,
    /// Accept once blending back from ragdoll has begun.
    OnBlend,
    /// Accept once the get-up animation has begun.
    OnGettingUp,
    /// Accept only while fully animated.
    OnAnimated,
    /// Accept when at least `hit_time_interval` has passed since the last
    /// accepted hit.
    Timed,
}

impl HitPolicy {
    /// Evaluate the gate for the current state and time since last hit.
    pub fn accepts(self, state: RagdollState, since_last_hit: f32, interval: f32) -> bool {
        match self {
            HitPolicy::Always => true,
            HitPolicy::OnBlend => state >= RagdollState::Blend,
            HitPolicy::OnGettingUp => state >= RagdollState::GettingUpAnim,
            HitPolicy::OnAnimated => state >= RagdollState::Animated,
            HitPolicy::Timed => since_last_hit >= interval,
        }
    }
}
