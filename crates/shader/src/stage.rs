use std::fmt;

/// One half of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn to_naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors from shader compilation.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} stage failed to parse:\n{message}")]
    Parse { stage: Stage, message: String },
    #[error("{stage} stage failed validation:\n{message}")]
    Validation { stage: Stage, message: String },
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
}

/// Parse and validate one composed GLSL stage with the naga front-end.
///
/// Diagnostics are rendered against `source`, so line numbers refer to the
/// composed text (version directive and preamble included).
pub fn validate_stage(stage: Stage, source: &str) -> Result<naga::Module, ShaderError> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options::from(stage.to_naga());
    let module = frontend
        .parse(&options, source)
        .map_err(|errors| ShaderError::Parse {
            stage,
            message: errors.emit_to_string(source),
        })?;
    if module.entry_points.is_empty() {
        return Err(ShaderError::Parse {
            stage,
            message: "no `main` entry point".into(),
        });
    }

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|error| ShaderError::Validation {
        stage,
        message: error.emit_to_string(source),
    })?;

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"#version 450
layout(location = 0) in vec3 a_position;
void main() {
    gl_Position = vec4(a_position, 1.0);
}
"#;

    const FRAGMENT: &str = r#"#version 450
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(1.0, 0.0, 1.0, 1.0);
}
"#;

    #[test]
    fn valid_stages_pass() {
        assert!(validate_stage(Stage::Vertex, VERTEX).is_ok());
        assert!(validate_stage(Stage::Fragment, FRAGMENT).is_ok());
    }

    #[test]
    fn syntax_error_is_a_parse_error() {
        let broken = FRAGMENT.replace("o_color = vec4", "o_color = vec4(");
        let err = validate_stage(Stage::Fragment, &broken).unwrap_err();
        assert!(matches!(err, ShaderError::Parse { stage: Stage::Fragment, .. }));
    }

    #[test]
    fn empty_source_fails() {
        assert!(validate_stage(Stage::Vertex, "").is_err());
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Vertex.to_string(), "vertex");
        assert_eq!(Stage::Fragment.to_string(), "fragment");
    }
}
