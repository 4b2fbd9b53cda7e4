//! The two scene pipelines: textured triangles for bodies and the ring, and
//! flat white line strips for orbit paths.
//!
//! Both read a per-draw [`DrawUniforms`] block from group 0 through a dynamic
//! offset. The textured pipeline also binds the body texture at group 1.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use orrery_mesh::{LINE_VERTEX_LAYOUT, TEXTURED_VERTEX_LAYOUT};

use crate::depth::DepthBuffer;
use crate::shader::{ShaderError, ShaderLibrary};

pub const TEXTURED_SHADER_NAME: &str = "textured";
pub const LINE_SHADER_NAME: &str = "orbit-line";

/// Matrices for one draw call.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl DrawUniforms {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(model_view: glam::Mat4, projection: glam::Mat4) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

pub struct ScenePipelines {
    pub textured: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
    /// Group 0 for both pipelines; dynamic offset into the uniform buffer.
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
}

impl ScenePipelines {
    /// Compile both shaders and build the pipelines. A shader that fails
    /// validation aborts construction.
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, ShaderError> {
        let textured_shader =
            shaders.load_from_source(device, TEXTURED_SHADER_NAME, TEXTURED_SHADER_SOURCE)?;
        let line_shader = shaders.load_from_source(device, LINE_SHADER_NAME, LINE_SHADER_SOURCE)?;

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("draw-uniforms-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(DrawUniforms::SIZE),
                    },
                    count: None,
                }],
            });

        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("textured-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, texture_bind_group_layout],
            immediate_size: 0,
        });
        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            immediate_size: 0,
        });

        let textured = create_pipeline(
            device,
            "textured-pipeline",
            &textured_layout,
            &textured_shader,
            TEXTURED_VERTEX_LAYOUT,
            wgpu::PrimitiveTopology::TriangleList,
            surface_format,
        );
        let lines = create_pipeline(
            device,
            "line-pipeline",
            &line_layout,
            &line_shader,
            LINE_VERTEX_LAYOUT,
            wgpu::PrimitiveTopology::LineStrip,
            surface_format,
        );

        Ok(Self {
            textured,
            lines,
            uniform_bind_group_layout,
        })
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    topology: wgpu::PrimitiveTopology,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The starfield is viewed from inside.
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(DepthBuffer::stencil_state()),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// WGSL for textured bodies.
pub const TEXTURED_SHADER_SOURCE: &str = r#"
struct DrawUniforms {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@group(1) @binding(0)
var t_surface: texture_2d<f32>;
@group(1) @binding(1)
var s_surface: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.projection * draw.model_view * vec4<f32>(in.position, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(t_surface, s_surface, in.uv);
}
"#;

/// WGSL for orbit paths: position only, flat white.
pub const LINE_SHADER_SOURCE: &str = r#"
struct DrawUniforms {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return draw.projection * draw.model_view * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{TextureManager, create_test_device_queue};
    use glam::{Mat4, Vec3};

    #[test]
    fn test_uniform_block_is_two_matrices() {
        assert_eq!(DrawUniforms::SIZE, 128);
    }

    #[test]
    fn test_uniforms_are_column_major() {
        let mv = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let u = DrawUniforms::new(mv, Mat4::IDENTITY);
        assert_eq!(u.model_view[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.projection, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_pipelines_build() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let textures = TextureManager::new(&device, &queue, 1);
        let mut shaders = ShaderLibrary::new();
        let pipelines = ScenePipelines::new(
            &device,
            &mut shaders,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            textures.bind_group_layout(),
        );
        assert!(pipelines.is_ok());
        assert_eq!(shaders.len(), 2);
    }
}
