//! Ragdoll and hit-reaction manager.
//!
//! Drives a jointed multi-body skeleton between three regimes: fully
//! animated, fully simulated ("ragdoll"), and a timed blend back to
//! animation, with graduated reactions to discrete hit events. The
//! controller owns per-part runtime state and commands an externally
//! stepped [`physics::PhysicsWorld`]; animation is queried through the
//! [`AnimationPlayer`] trait.

pub mod animation;
pub mod blend;
pub mod body_part;
pub mod builder;
pub mod controller;
pub mod error;
pub mod events;
pub mod hit;
pub mod policy;
pub mod settings;
pub mod skeleton;

pub use animation::AnimationPlayer;
pub use body_part::{BodyPart, PartDrive};
pub use builder::{Capsule, PartBinding, RagdollBuilder};
pub use controller::{RagdollController, RagdollState};
pub use error::RagdollError;
pub use events::{Hook, RagdollEvent, RagdollHooks, RequestQueue};
pub use hit::ReactionOutcome;
pub use policy::HitPolicy;
pub use settings::RagdollSettings;
pub use skeleton::{HumanBodyPart, PartDef, SkeletonLayout, HUMANOID_PART_COUNT};
