use crate::program::{GpuCompiler, QuadProgram};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Background, (20, 20, 20) in sRGB.
const BACKGROUND_SRGB: f64 = 20.0 / 255.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GridUniforms {
    view_proj: [[f32; 4]; 4],
}

/// Mirrors the `Globals` block declared in `common.glsl` (std140).
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadUniforms {
    mvp: [[f32; 4]; 4],
    time: f32,
    aspect: f32,
    mouse_pos: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 3],
    texcoord: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GridVertex {
    position: [f32; 3],
    color: [f32; 4],
}

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

pub(crate) fn quad_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

/// Per-frame inputs of [`QuadRenderer::render`].
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub view_proj: Mat4,
    pub model: Mat4,
    /// Seconds since the effect was last (re)loaded.
    pub time: f32,
    pub aspect: f32,
    /// Cursor on the quad, in [0, 1] texture space.
    pub mouse_pos: Vec2,
}

/// Unit plane in XZ facing +Y, texture v growing towards +Z.
fn quad_mesh() -> (Vec<QuadVertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        QuadVertex { position: [-p, 0.0, -p], texcoord: [0.0, 0.0] },
        QuadVertex { position: [-p, 0.0,  p], texcoord: [0.0, 1.0] },
        QuadVertex { position: [ p, 0.0,  p], texcoord: [1.0, 1.0] },
        QuadVertex { position: [ p, 0.0, -p], texcoord: [1.0, 0.0] },
    ];
    let indices: Vec<u16> = vec![0, 1, 2, 2, 3, 0];
    (vertices, indices)
}

/// Generate grid floor line vertices: `slices` cells across, centered on the origin.
fn grid_mesh(slices: i32, spacing: f32) -> Vec<GridVertex> {
    let mut verts = Vec::new();
    let half = slices / 2;
    let extent = half as f32 * spacing;

    for i in -half..=half {
        let offset = i as f32 * spacing;
        let color = if i == 0 {
            [0.5, 0.5, 0.5, 1.0]
        } else {
            [0.75, 0.75, 0.75, 1.0]
        };
        // Lines along X
        verts.push(GridVertex {
            position: [-extent, 0.0, offset],
            color,
        });
        verts.push(GridVertex {
            position: [extent, 0.0, offset],
            color,
        });
        // Lines along Z
        verts.push(GridVertex {
            position: [offset, 0.0, -extent],
            color,
        });
        verts.push(GridVertex {
            position: [offset, 0.0, extent],
            color,
        });
    }
    verts
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Renders the effect quad and the reference grid.
pub struct QuadRenderer {
    grid_pipeline: wgpu::RenderPipeline,
    grid_uniform_buffer: wgpu::Buffer,
    grid_bind_group: wgpu::BindGroup,
    grid_vertex_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
    quad_pipeline_layout: wgpu::PipelineLayout,
    quad_uniform_buffer: wgpu::Buffer,
    quad_bind_group: wgpu::BindGroup,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    quad_index_count: u32,
    depth_texture: wgpu::TextureView,
    msaa_texture: Option<wgpu::TextureView>,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
}

impl QuadRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
    ) -> Self {
        // Grid: built-in WGSL pipeline with its own view-projection uniform.
        let grid_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_uniform_buffer"),
            contents: bytemuck::bytes_of(&GridUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let grid_bind_group_layout = uniform_layout(device, "grid", wgpu::ShaderStages::VERTEX);
        let grid_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grid_bind_group"),
            layout: &grid_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: grid_uniform_buffer.as_entire_binding(),
            }],
        });
        let grid_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grid_pipeline_layout"),
            bind_group_layouts: &[&grid_bind_group_layout],
            push_constant_ranges: &[],
        });

        let grid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grid_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::GRID_SHADER.into()),
        });

        let grid_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grid_pipeline"),
            layout: Some(&grid_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &grid_shader,
                entry_point: Some("vs_grid"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GridVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &grid_shader,
                entry_point: Some("fs_grid"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
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
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let grid_verts = grid_mesh(10, 1.0);
        let grid_vertex_count = grid_verts.len() as u32;
        let grid_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertex_buffer"),
            contents: bytemuck::cast_slice(&grid_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Quad: pipeline comes from the loaded effect, the rest lives here.
        let quad_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_uniform_buffer"),
            size: std::mem::size_of::<QuadUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let quad_bind_group_layout =
            uniform_layout(device, "quad", wgpu::ShaderStages::VERTEX_FRAGMENT);
        let quad_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad_bind_group"),
            layout: &quad_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: quad_uniform_buffer.as_entire_binding(),
            }],
        });
        let quad_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pipeline_layout"),
            bind_group_layouts: &[&quad_bind_group_layout],
            push_constant_ranges: &[],
        });

        let (quad_verts, quad_indices) = quad_mesh();
        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&quad_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_index_buffer"),
            contents: bytemuck::cast_slice(&quad_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let quad_index_count = quad_indices.len() as u32;

        let depth_texture = Self::create_depth_texture(device, width, height, sample_count);
        let msaa_texture =
            Self::create_msaa_texture(device, surface_format, width, height, sample_count);

        Self {
            grid_pipeline,
            grid_uniform_buffer,
            grid_bind_group,
            grid_vertex_buffer,
            grid_vertex_count,
            quad_pipeline_layout,
            quad_uniform_buffer,
            quad_bind_group,
            quad_vertex_buffer,
            quad_index_buffer,
            quad_index_count,
            depth_texture,
            msaa_texture,
            surface_format,
            sample_count,
        }
    }

    /// Compiler producing programs compatible with this renderer's targets.
    pub fn compiler<'a>(&'a self, device: &'a wgpu::Device) -> GpuCompiler<'a> {
        GpuCompiler {
            device,
            layout: &self.quad_pipeline_layout,
            surface_format: self.surface_format,
            sample_count: self.sample_count,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height, self.sample_count);
        self.msaa_texture = Self::create_msaa_texture(
            device,
            self.surface_format,
            width,
            height,
            self.sample_count,
        );
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Render one frame into `view`: clear, effect quad, then grid.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &FrameParams,
        program: &QuadProgram,
    ) {
        queue.write_buffer(
            &self.grid_uniform_buffer,
            0,
            bytemuck::bytes_of(&GridUniforms {
                view_proj: frame.view_proj.to_cols_array_2d(),
            }),
        );
        queue.write_buffer(
            &self.quad_uniform_buffer,
            0,
            bytemuck::bytes_of(&QuadUniforms {
                mvp: (frame.view_proj * frame.model).to_cols_array_2d(),
                time: frame.time,
                aspect: frame.aspect,
                mouse_pos: frame.mouse_pos.to_array(),
            }),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let (color_view, resolve_target) = match &self.msaa_texture {
            Some(msaa) => (msaa, Some(view)),
            None => (view, None),
        };
        let background = srgb_to_linear(BACKGROUND_SRGB);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background,
                            g: background,
                            b: background,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Effect quad
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &self.quad_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
            pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.quad_index_count, 0, 0..1);

            // Reference grid
            pass.set_pipeline(&self.grid_pipeline);
            pass.set_bind_group(0, &self.grid_bind_group, &[]);
            pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
            pass.draw(0..self.grid_vertex_count, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&Default::default()))
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    name: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{name}_bind_group_layout")),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn quad_uniforms_follow_std140_layout() {
        assert_eq!(size_of::<QuadUniforms>(), 80);
        assert_eq!(offset_of!(QuadUniforms, mvp), 0);
        assert_eq!(offset_of!(QuadUniforms, time), 64);
        assert_eq!(offset_of!(QuadUniforms, aspect), 68);
        assert_eq!(offset_of!(QuadUniforms, mouse_pos), 72);
    }

    #[test]
    fn quad_is_unit_plane_facing_up() {
        let (verts, indices) = quad_mesh();
        assert_eq!(verts.len(), 4);
        assert_eq!(indices.len(), 6);
        for v in &verts {
            assert_eq!(v.position[1], 0.0);
            assert_eq!(v.position[0].abs(), 0.5);
            assert_eq!(v.position[2].abs(), 0.5);
            // Texture coordinates follow the XZ position.
            assert_eq!(v.texcoord[0], v.position[0] + 0.5);
            assert_eq!(v.texcoord[1], v.position[2] + 0.5);
        }
    }

    #[test]
    fn grid_has_ten_cells() {
        let verts = grid_mesh(10, 1.0);
        // 11 lines per axis, 2 vertices each
        assert_eq!(verts.len(), 11 * 4);
        assert!(verts.iter().all(|v| v.position[0].abs() <= 5.0));
    }

    #[test]
    fn background_is_dark_linear() {
        let c = srgb_to_linear(BACKGROUND_SRGB);
        assert!(c > 0.0 && c < 0.01);
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-9);
    }
}
