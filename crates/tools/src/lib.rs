//! Developer overlay state: transient status messages and frame statistics.
//!
//! # Invariants
//! - Overlay state is UI-toolkit agnostic; the binary decides how to draw it.

mod message;
mod stats;

pub use message::{MESSAGE_DURATION, MessageKind, TransientMessage};
pub use stats::FrameStats;
