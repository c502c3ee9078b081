//! Shader source loading.
//!
//! Layout inside the shader directory:
//! ```text
//! common.glsl   - preamble prepended to every stage
//! base.vert     - vertex stage shared by all effects
//! effect.frag   - fragment stage under preview (hot-reloaded)
//! error.frag    - fragment stage bound when the effect fails
//! ```

use crate::stage::ShaderError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Directive every composed stage starts with.
pub const VERSION_DIRECTIVE: &str = "#version 450";
/// Preamble file shared by every stage.
pub const PREAMBLE_FILE: &str = "common.glsl";

/// Turns a pair of composed stage sources into a program.
///
/// Implemented by the GPU backend; tests substitute a CPU-only compiler.
pub trait ShaderCompiler {
    type Program;

    fn compile(&mut self, vertex: &str, fragment: &str) -> Result<Self::Program, ShaderError>;
}

/// File names of the two stages of one program, relative to the shader directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePair {
    pub vertex: String,
    pub fragment: String,
}

impl StagePair {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Modification times of both stage files; `None` when a file could not be stat'ed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStamps {
    pub vertex: Option<SystemTime>,
    pub fragment: Option<SystemTime>,
}

impl SourceStamps {
    /// True if either stage is newer than in `loaded`.
    ///
    /// A file that appears after having been missing counts as newer; a file
    /// that disappears does not.
    pub fn is_newer_than(&self, loaded: &SourceStamps) -> bool {
        fn newer(current: Option<SystemTime>, loaded: Option<SystemTime>) -> bool {
            match (current, loaded) {
                (Some(current), Some(loaded)) => current > loaded,
                (Some(_), None) => true,
                (None, _) => false,
            }
        }
        newer(self.vertex, loaded.vertex) || newer(self.fragment, loaded.fragment)
    }
}

/// Outcome of one load: the program (or why it failed) plus the stamps
/// captured before the sources were read.
#[derive(Debug)]
pub struct LoadedShader<P> {
    pub program: Result<P, ShaderError>,
    pub stamps: SourceStamps,
}

impl<P> LoadedShader<P> {
    pub fn succeeded(&self) -> bool {
        self.program.is_ok()
    }
}

/// Reads stage files from one directory and composes them with the preamble.
#[derive(Debug, Clone)]
pub struct ShaderLoader {
    dir: PathBuf,
}

impl ShaderLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Version directive, preamble and stage file, newline-joined.
    pub fn compose(&self, stage_file: &str) -> String {
        let preamble = read_or_empty(&self.path(PREAMBLE_FILE));
        let stage = read_or_empty(&self.path(stage_file));
        compose_source(&preamble, &stage)
    }

    pub fn stamps(&self, pair: &StagePair) -> SourceStamps {
        SourceStamps {
            vertex: modified(&self.path(&pair.vertex)),
            fragment: modified(&self.path(&pair.fragment)),
        }
    }

    /// Compose both stages of `pair` and hand them to `compiler`.
    ///
    /// Missing files never abort the load: they compose to an empty stage,
    /// which the compiler then rejects.
    pub fn load<C: ShaderCompiler>(
        &self,
        compiler: &mut C,
        pair: &StagePair,
    ) -> LoadedShader<C::Program> {
        // Stamp before reading so a write racing the read shows up as a newer file.
        let stamps = self.stamps(pair);
        let vertex = self.compose(&pair.vertex);
        let fragment = self.compose(&pair.fragment);

        let program = compiler.compile(&vertex, &fragment);
        match &program {
            Ok(_) => tracing::info!("loaded shader {} + {}", pair.vertex, pair.fragment),
            Err(e) => tracing::warn!("failed to load shader {} + {}: {e}", pair.vertex, pair.fragment),
        }
        LoadedShader { program, stamps }
    }
}

pub fn compose_source(preamble: &str, stage: &str) -> String {
    format!("{VERSION_DIRECTIVE}\n{preamble}\n{stage}")
}

fn read_or_empty(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("cannot read {}: {e}", path.display());
            String::new()
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
