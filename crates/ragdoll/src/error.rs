//! Error types for ragdoll construction and configuration.

use thiserror::Error;

/// Configuration errors surfaced once, at initialization. A controller
/// that fails to construct never ticks.
#[derive(Debug, Error)]
pub enum RagdollError {
    /// The skeleton layout is malformed (empty, bad parent ordering,
    /// constrained index out of range).
    #[error("invalid skeleton layout: {0}")]
    InvalidLayout(String),

    /// A body part is missing its physical binding (wrong binding count or
    /// degenerate collision volume).
    #[error("incomplete ragdoll: part {index} ({name}) has no usable body binding")]
    IncompletePart { index: usize, name: String },

    /// Settings file could not be parsed.
    #[error("invalid ragdoll settings: {0}")]
    InvalidSettings(String),
}
