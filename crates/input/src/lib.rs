//! Input layer: raw window events are folded into per-frame snapshots.
//!
//! # Invariants
//! - No dependency on a windowing crate; the binary maps its events here.
//! - Discrete actions are applied by the frame loop, not when the key arrives.

pub mod action;
pub mod frame;

pub use action::Action;
pub use frame::{CameraInput, FrameInput, FrameSnapshot};
