use crate::gpu::{DEPTH_FORMAT, quad_vertex_layout};
use crate::shaders::GLSL_ENTRY_POINT;
use shadeview_shader::{ShaderCompiler, ShaderError, Stage, validate_stage};

/// A compiled effect: the quad pipeline built from one vertex/fragment pair.
///
/// Dropping it releases the GPU pipeline.
pub struct QuadProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
}

/// Compiles composed GLSL stages into [`QuadProgram`]s on one device.
///
/// Both stages go through the naga GLSL front-end first so syntax and type
/// errors come back as [`ShaderError`] with source locations. Anything wgpu
/// still rejects is caught with a validation error scope instead of reaching
/// the device's uncaptured-error handler.
pub struct GpuCompiler<'a> {
    pub(crate) device: &'a wgpu::Device,
    pub(crate) layout: &'a wgpu::PipelineLayout,
    pub(crate) surface_format: wgpu::TextureFormat,
    pub(crate) sample_count: u32,
}

impl GpuCompiler<'_> {
    fn module(&self, stage: Stage, source: &str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    Stage::Vertex => "quad_vertex_shader",
                    Stage::Fragment => "quad_fragment_shader",
                }),
                source: wgpu::ShaderSource::Glsl {
                    shader: source.to_owned().into(),
                    stage: stage.to_naga(),
                    defines: Default::default(),
                },
            })
    }
}

impl ShaderCompiler for GpuCompiler<'_> {
    type Program = QuadProgram;

    fn compile(&mut self, vertex: &str, fragment: &str) -> Result<QuadProgram, ShaderError> {
        let _span = tracing::info_span!("compile_program").entered();

        validate_stage(Stage::Vertex, vertex)?;
        validate_stage(Stage::Fragment, fragment)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = self.module(Stage::Vertex, vertex);
        let fragment_module = self.module(Stage::Fragment, fragment);

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("quad_pipeline"),
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some(GLSL_ENTRY_POINT),
                    compilation_options: Default::default(),
                    buffers: &[quad_vertex_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some(GLSL_ENTRY_POINT),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: self.sample_count,
                    ..Default::default()
                },
                multiview: None,
                cache: None,
            });

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ShaderError::Pipeline(error.to_string()));
        }

        Ok(QuadProgram { pipeline })
    }
}
