//! Core types shared by the ragdoll runtime:
//! - Transform and spatial helpers
//! - Frame time management

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used math types
pub use glam::{Mat4, Quat, Vec3, Vec4};
