//! Shader sources: composition, GLSL validation and hot-reload bookkeeping.
//!
//! Nothing here touches the GPU. The render backend implements
//! [`ShaderCompiler`]; the frame loop drives [`ReloadMonitor`] and installs
//! loads into [`ShaderSlots`].
//!
//! # Invariants
//! - A missing or unreadable file composes to an empty stage and fails to
//!   compile; loading itself never errors.
//! - The error program is never hot-reloaded.

mod loader;
mod monitor;
mod slots;
mod stage;

pub use loader::{
    LoadedShader, PREAMBLE_FILE, ShaderCompiler, ShaderLoader, SourceStamps, StagePair,
    VERSION_DIRECTIVE, compose_source,
};
pub use monitor::{MonitorState, ReloadConfig, ReloadMonitor};
pub use slots::ShaderSlots;
pub use stage::{ShaderError, Stage, validate_stage};

/// Vertex stage shared by every program.
pub const BASE_VERTEX: &str = "base.vert";
/// Fragment stage under preview.
pub const EFFECT_FRAGMENT: &str = "effect.frag";
/// Fragment stage bound when the effect fails to compile.
pub const ERROR_FRAGMENT: &str = "error.frag";
