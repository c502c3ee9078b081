//! Shared types and vector math for the shadeview preview tool.
//!
//! # Invariants
//! - Everything here is pure: no I/O, no GPU state.

mod ray;
mod types;

pub use ray::{PARALLEL_EPSILON, Ray, RayHit, intersect_plane};
pub use types::{AspectMode, Transform};
