//! [`RenderBackend`] implementation on wgpu.
//!
//! Submissions are collected during dispatch: each one gets a slot in a
//! dynamic-offset uniform buffer and a draw command. [`SceneRenderer::render`]
//! then uploads the uniforms and records a single pass that clears colour and
//! depth and replays the commands in submission order.

use std::num::NonZeroU64;

use orrery_mesh::PrimitiveKind;
use orrery_scene::{DrawSubmission, RenderBackend, SceneCatalog, TextureHandle};

use crate::buffer::{BufferAllocator, GpuMesh};
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pipeline::{DrawUniforms, ScenePipelines};
use crate::shader::{ShaderError, ShaderLibrary};
use crate::texture::TextureManager;
use crate::texture_loader::LoadedTexture;

/// Uniform slots allocated up front; the buffer doubles when exceeded.
const INITIAL_DRAW_CAPACITY: u32 = 32;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("draw submitted for unknown geometry {0}")]
    UnknownGeometry(u32),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawCommand {
    geometry: usize,
    texture: Option<TextureHandle>,
    kind: PrimitiveKind,
    uniform_offset: u32,
}

pub struct SceneRenderer {
    shaders: ShaderLibrary,
    pipelines: ScenePipelines,
    meshes: Vec<GpuMesh>,
    textures: TextureManager,
    depth: DepthBuffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    uniform_capacity: u32,
    uniform_staging: Vec<u8>,
    draws: Vec<DrawCommand>,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    /// Upload every catalog geometry, build pipelines and point every texture
    /// slot at the placeholder.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        size: (u32, u32),
        catalog: &SceneCatalog,
        clear_color: [f64; 4],
    ) -> Result<Self, RenderError> {
        let mut shaders = ShaderLibrary::new();
        let textures = TextureManager::new(device, queue, catalog.textures().len());
        let pipelines = ScenePipelines::new(
            device,
            &mut shaders,
            surface_format,
            textures.bind_group_layout(),
        )?;
        let meshes = BufferAllocator::new(device).create_meshes(catalog.geometries());
        let depth = DepthBuffer::new(device, size.0, size.1);

        let uniform_stride = uniform_stride(
            DrawUniforms::SIZE,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let (uniform_buffer, uniform_bind_group) = create_uniforms(
            device,
            &pipelines.uniform_bind_group_layout,
            uniform_stride,
            INITIAL_DRAW_CAPACITY,
        );

        let [r, g, b, a] = clear_color;
        Ok(Self {
            shaders,
            pipelines,
            meshes,
            textures,
            depth,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            uniform_capacity: INITIAL_DRAW_CAPACITY,
            uniform_staging: Vec::new(),
            draws: Vec::new(),
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Convenience constructor using the context's device and surface.
    pub fn for_context(
        ctx: &RenderContext,
        catalog: &SceneCatalog,
        clear_color: [f64; 4],
    ) -> Result<Self, RenderError> {
        Self::new(
            &ctx.device,
            &ctx.queue,
            ctx.surface_format,
            ctx.size(),
            catalog,
            clear_color,
        )
    }

    /// Follow the surface size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    /// Draws queued since the last render.
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    /// Upload a decoded image into its slot. Failures keep the placeholder.
    pub fn receive_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        loaded: LoadedTexture,
    ) {
        let label = loaded.path.display().to_string();
        let image = match loaded.result {
            Ok(image) => image,
            Err(e) => {
                log::warn!("{e}; keeping placeholder for slot {}", loaded.handle.0);
                return;
            }
        };
        if let Err(e) = self.textures.create_texture(
            device,
            queue,
            loaded.handle,
            &label,
            &image.rgba,
            image.width,
            image.height,
        ) {
            log::warn!("Texture {label} rejected: {e}");
        }
    }

    /// Acquire the next surface image, draw the queued submissions and
    /// present.
    pub fn render(&mut self, ctx: &RenderContext) -> Result<(), RenderError> {
        let frame = match ctx.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                self.discard_pending();
                return Err(e.into());
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_view(&ctx.device, &ctx.queue, &view);
        frame.present();
        Ok(())
    }

    /// Record and submit the queued draws into `target`. Clears the queue.
    pub fn render_to_view(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
    ) {
        self.ensure_uniform_capacity(device);
        if !self.uniform_staging.is_empty() {
            queue.write_buffer(&self.uniform_buffer, 0, &self.uniform_staging);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene-encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(self.depth.attachment()),
                ..Default::default()
            });

            let mut bound_kind = None;
            for draw in &self.draws {
                if bound_kind != Some(draw.kind) {
                    pass.set_pipeline(match draw.kind {
                        PrimitiveKind::Triangles => &self.pipelines.textured,
                        PrimitiveKind::LineLoop => &self.pipelines.lines,
                    });
                    bound_kind = Some(draw.kind);
                }
                pass.set_bind_group(0, &self.uniform_bind_group, &[draw.uniform_offset]);
                if draw.kind == PrimitiveKind::Triangles {
                    let texture = match draw.texture {
                        Some(handle) => self.textures.get(handle),
                        None => self.textures.placeholder(),
                    };
                    pass.set_bind_group(1, &texture.bind_group, &[]);
                }
                self.meshes[draw.geometry].draw(&mut pass);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));

        self.discard_pending();
    }

    /// Drop every draw queued since the last render.
    pub fn discard_pending(&mut self) {
        self.draws.clear();
        self.uniform_staging.clear();
    }

    fn ensure_uniform_capacity(&mut self, device: &wgpu::Device) {
        let needed = self.draws.len() as u32;
        if needed <= self.uniform_capacity {
            return;
        }
        let capacity = needed.max(self.uniform_capacity * 2);
        log::debug!("Growing draw uniform buffer to {capacity} slots");
        let (buffer, bind_group) = create_uniforms(
            device,
            &self.pipelines.uniform_bind_group_layout,
            self.uniform_stride,
            capacity,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }
}

impl RenderBackend for SceneRenderer {
    type Error = RenderError;

    fn submit(&mut self, submission: &DrawSubmission) -> Result<(), Self::Error> {
        let geometry = submission.geometry.0 as usize;
        if geometry >= self.meshes.len() {
            return Err(RenderError::UnknownGeometry(submission.geometry.0));
        }

        let offset = self.draws.len() as u64 * self.uniform_stride;
        let uniforms = DrawUniforms::new(submission.model_view, submission.projection);
        self.uniform_staging
            .resize((offset + self.uniform_stride) as usize, 0);
        self.uniform_staging[offset as usize..(offset + DrawUniforms::SIZE) as usize]
            .copy_from_slice(bytemuck::bytes_of(&uniforms));

        self.draws.push(DrawCommand {
            geometry,
            texture: submission.texture,
            kind: submission.kind,
            uniform_offset: offset as u32,
        });
        Ok(())
    }
}

/// Round `size` up to the device's dynamic-offset alignment.
fn uniform_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment.max(1)) * alignment.max(1)
}

fn create_uniforms(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: u32,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draw-uniforms"),
        size: stride * u64::from(capacity),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("draw-uniforms-bind-group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(DrawUniforms::SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}
