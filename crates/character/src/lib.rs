//! Character-side integration of the ragdoll controller: the ragdoll-user
//! trait for anything that can be knocked down, and a concrete adapter that
//! wires the standard hook chain.

pub mod character;
pub mod ragdoll_user;

pub use character::CharacterAdapter;
pub use ragdoll_user::RagdollUser;
