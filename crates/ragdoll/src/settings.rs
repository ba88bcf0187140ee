//! Ragdoll tuning values. Loaded from a RON file or built in code.

use crate::policy::HitPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed-at-setup configuration for one ragdoll controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagdollSettings {
    /// Blend time from ragdoll to animator, seconds.
    #[serde(default = "default_blend_time")]
    pub blend_time: f32,
    /// Minimum seconds between accepted hits under the `Timed` policy.
    #[serde(default = "default_hit_time_interval")]
    pub hit_time_interval: f32,
    /// Controls how the character reacts to hits; larger resists more.
    #[serde(default = "default_hit_resistance")]
    pub hit_resistance: f32,
    /// Hit velocity magnitude above which the character goes full ragdoll.
    #[serde(default = "default_hit_reaction_tolerance")]
    pub hit_reaction_tolerance: f32,
    /// Character weight factor; influences partial reaction duration.
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// When the controller accepts incoming hits.
    #[serde(default)]
    pub hit_policy: HitPolicy,
    /// Seconds of full ragdoll before the timed event fires.
    #[serde(default = "default_ragdoll_event_time")]
    pub ragdoll_event_time: f32,
    /// Anchor constrained parts with joints during partial reactions.
    /// When false they are frozen kinematically instead.
    #[serde(default = "default_true")]
    pub use_joints: bool,
    /// Play a recovery animation after a full ragdoll.
    #[serde(default = "default_true")]
    pub enable_get_up_animation: bool,
    /// Recovery clip when the character ended face down.
    #[serde(default = "default_get_up_front")]
    pub get_up_front_clip: String,
    /// Recovery clip when the character ended on its back.
    #[serde(default = "default_get_up_back")]
    pub get_up_back_clip: String,
    /// Root-motion setting restored when a blend completes.
    #[serde(default = "default_true")]
    pub root_motion: bool,
}

fn default_blend_time() -> f32 {
    0.4
}
fn default_hit_time_interval() -> f32 {
    0.25
}
fn default_hit_resistance() -> f32 {
    8.0
}
fn default_hit_reaction_tolerance() -> f32 {
    20.0
}
fn default_weight() -> f32 {
    32.0
}
fn default_ragdoll_event_time() -> f32 {
    6.0
}
fn default_true() -> bool {
    true
}
fn default_get_up_front() -> String {
    "GetUpFront".to_string()
}
fn default_get_up_back() -> String {
    "GetUpBack".to_string()
}

impl Default for RagdollSettings {
    fn default() -> Self {
        Self {
            blend_time: default_blend_time(),
            hit_time_interval: default_hit_time_interval(),
            hit_resistance: default_hit_resistance(),
            hit_reaction_tolerance: default_hit_reaction_tolerance(),
            weight: default_weight(),
            hit_policy: HitPolicy::default(),
            ragdoll_event_time: default_ragdoll_event_time(),
            use_joints: true,
            enable_get_up_animation: true,
            get_up_front_clip: default_get_up_front(),
            get_up_back_clip: default_get_up_back(),
            root_motion: true,
        }
    }
}

impl RagdollSettings {
    /// Load settings from a RON file. Missing or invalid files fall back to
    /// defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(s) => return s,
                Err(e) => log::warn!("Invalid ragdoll settings at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }
}
