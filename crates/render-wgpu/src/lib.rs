//! wgpu render backend for the shader preview.
//!
//! Renders the effect quad with a hot-swappable GLSL program and a reference
//! grid floor. The camera is an orbit camera driven by middle-mouse drags.
//!
//! # Invariants
//! - The renderer never owns the effect program; the caller passes the bound one each frame.
//! - Programs are only built through [`GpuCompiler`], so they always match the
//!   renderer's color format, depth format and sample count.

mod camera;
mod gpu;
mod program;
mod shaders;

pub use camera::{
    CameraController, CameraSpeeds, CameraState, DEFAULT_POSITION, Projection,
    WIDESCREEN_DEPTH_OFFSET,
};
pub use gpu::{FrameParams, QuadRenderer};
pub use program::{GpuCompiler, QuadProgram};
