//! GPU textures for body surfaces.
//!
//! [`TextureManager`] owns one slot per catalog texture. Every slot starts out
//! bound to a 1×1 opaque white placeholder and is swapped for the real image
//! once it has been decoded and uploaded.
//!
//! Sampling follows the image size: power-of-two images get a full mip chain,
//! repeat wrapping and trilinear filtering; anything else is clamped to edge,
//! linearly filtered and has no mips.

use orrery_scene::TextureHandle;

/// Texel format used for every body texture.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Pixels of the placeholder texture.
pub const PLACEHOLDER_RGBA: [u8; 4] = [255, 255, 255, 255];

/// A GPU texture with its view, bind group, and metadata.
pub struct ManagedTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Texture + sampler, ready for group 1 of the textured pipeline.
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
    pub policy: SamplerPolicy,
    /// 1 unless the policy is [`SamplerPolicy::Mipmapped`].
    pub mip_level_count: u32,
}

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error(
        "texture data size ({actual}) does not match expected ({expected}) for {width}x{height}"
    )]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("no texture slot {0}")]
    UnknownSlot(u32),
}

/// How a texture is sampled, decided by its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerPolicy {
    /// Both sides are powers of two: mipmaps, repeat, linear-mipmap-linear.
    Mipmapped,
    /// Clamp to edge, linear, no mipmaps.
    ClampLinear,
}

impl SamplerPolicy {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width.is_power_of_two() && height.is_power_of_two() {
            Self::Mipmapped
        } else {
            Self::ClampLinear
        }
    }

    /// Mip levels to allocate for a `width`×`height` image under this policy.
    pub fn mip_levels(self, width: u32, height: u32) -> u32 {
        match self {
            Self::Mipmapped => mip_level_count(width, height),
            Self::ClampLinear => 1,
        }
    }
}

/// Full chain length down to 1×1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// One slot per catalog texture, plus the shared placeholder.
pub struct TextureManager {
    slots: Vec<Option<ManagedTexture>>,
    placeholder: ManagedTexture,
    sampler_mipmapped: wgpu::Sampler,
    sampler_clamp: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    blit_pipeline: wgpu::RenderPipeline,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
}

/// Downsamples one mip level into the next by drawing a single triangle that
/// covers the whole target.
const BLIT_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var previous_level: texture_2d<f32>;
@group(0) @binding(1) var linear_sampler: sampler;

struct Fullscreen {
    @builtin(position) clip: vec4<f32>,
    @location(0) texcoord: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) corner: u32) -> Fullscreen {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    let ndc = corners[corner];
    var v: Fullscreen;
    v.clip = vec4<f32>(ndc, 0.0, 1.0);
    v.texcoord = vec2<f32>(0.5 * (ndc.x + 1.0), 0.5 * (1.0 - ndc.y));
    return v;
}

@fragment
fn fs_main(v: Fullscreen) -> @location(0) vec4<f32> {
    return textureSample(previous_level, linear_sampler, v.texcoord);
}
"#;

fn sampled_texture_layout(label: &str, device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

impl TextureManager {
    /// Create `slot_count` empty slots and upload the placeholder.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, slot_count: usize) -> Self {
        let sampler_mipmapped = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-mipmapped"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let sampler_clamp = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-clamp"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = sampled_texture_layout("texture-bind-group-layout", device);
        let blit_bind_group_layout = sampled_texture_layout("blit-bind-group-layout", device);

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit-shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER_SOURCE.into()),
        });

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit-pipeline-layout"),
            bind_group_layouts: &[&blit_bind_group_layout],
            immediate_size: 0,
        });

        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mipmap-pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TEXTURE_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let placeholder = upload(
            device,
            queue,
            "placeholder",
            &PLACEHOLDER_RGBA,
            1,
            1,
            &bind_group_layout,
            &sampler_mipmapped,
            SamplerPolicy::Mipmapped,
        );

        let mut slots = Vec::with_capacity(slot_count);
        slots.resize_with(slot_count, || None);

        Self {
            slots,
            placeholder,
            sampler_mipmapped,
            sampler_clamp,
            bind_group_layout,
            blit_pipeline,
            blit_bind_group_layout,
            blit_sampler,
        }
    }

    /// Upload RGBA8 pixels into `handle`'s slot, replacing the placeholder.
    #[allow(clippy::too_many_arguments)]
    pub fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: TextureHandle,
        label: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<&ManagedTexture, TextureError> {
        let index = handle.0 as usize;
        if index >= self.slots.len() {
            return Err(TextureError::UnknownSlot(handle.0));
        }
        validate_dimensions(width, height)?;
        validate_data_size(rgba, width, height)?;

        let policy = SamplerPolicy::for_dimensions(width, height);
        let sampler = match policy {
            SamplerPolicy::Mipmapped => &self.sampler_mipmapped,
            SamplerPolicy::ClampLinear => &self.sampler_clamp,
        };
        let managed = upload(
            device,
            queue,
            label,
            rgba,
            width,
            height,
            &self.bind_group_layout,
            sampler,
            policy,
        );
        if managed.mip_level_count > 1 {
            self.generate_mipmaps(device, queue, &managed.texture, managed.mip_level_count);
        }

        log::info!(
            "Created texture '{label}' ({width}x{height}, {policy:?}, {} mips)",
            managed.mip_level_count
        );
        Ok(self.slots[index].insert(managed))
    }

    /// Texture to bind for `handle`: the uploaded image, or the placeholder.
    pub fn get(&self, handle: TextureHandle) -> &ManagedTexture {
        self.slots
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .unwrap_or(&self.placeholder)
    }

    pub fn is_loaded(&self, handle: TextureHandle) -> bool {
        matches!(self.slots.get(handle.0 as usize), Some(Some(_)))
    }

    pub fn placeholder(&self) -> &ManagedTexture {
        &self.placeholder
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Layout for group 1 of the textured pipeline.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Fill mip levels 1.. by repeatedly blitting the previous level.
    fn generate_mipmaps(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        mip_count: u32,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mipmap-encoder"),
        });

        for level in 1..mip_count {
            let src_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level - 1,
                mip_level_count: Some(1),
                ..Default::default()
            });

            let dst_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level,
                mip_level_count: Some(1),
                ..Default::default()
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mipmap-bind-group"),
                layout: &self.blit_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&src_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mipmap-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dst_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Create the texture, write level 0 and build its bind group.
#[allow(clippy::too_many_arguments)]
fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    rgba: &[u8],
    width: u32,
    height: u32,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    policy: SamplerPolicy,
) -> ManagedTexture {
    let mip_levels = policy.mip_levels(width, height);
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: mip_levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: None,
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-bind-group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    ManagedTexture {
        texture,
        view,
        bind_group,
        dimensions: (width, height),
        policy,
        mip_level_count: mip_levels,
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn validate_data_size(data: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// Create a test GPU device and queue. Returns `None` if no GPU is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blit_shader_validates() {
        assert!(crate::shader::validate_wgsl(BLIT_SHADER_SOURCE).is_ok());
    }

    #[test]
    fn test_power_of_two_policy() {
        assert_eq!(
            SamplerPolicy::for_dimensions(1024, 512),
            SamplerPolicy::Mipmapped
        );
        assert_eq!(SamplerPolicy::for_dimensions(1, 1), SamplerPolicy::Mipmapped);
        assert_eq!(
            SamplerPolicy::for_dimensions(1000, 512),
            SamplerPolicy::ClampLinear
        );
        assert_eq!(
            SamplerPolicy::for_dimensions(512, 300),
            SamplerPolicy::ClampLinear
        );
    }

    #[test]
    fn test_mip_level_count_calculation() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(512, 256), 10);
        assert_eq!(mip_level_count(2048, 1024), 12);
    }

    #[test]
    fn test_clamp_policy_has_single_level() {
        assert_eq!(SamplerPolicy::ClampLinear.mip_levels(1000, 500), 1);
        assert_eq!(SamplerPolicy::Mipmapped.mip_levels(4, 4), 3);
    }

    #[test]
    fn test_data_validation() {
        assert!(matches!(
            validate_dimensions(0, 4),
            Err(TextureError::ZeroDimensions { .. })
        ));
        assert!(matches!(
            validate_data_size(&[0; 32], 4, 4),
            Err(TextureError::DataSizeMismatch {
                expected: 64,
                ..
            })
        ));
        assert!(validate_data_size(&[0; 64], 4, 4).is_ok());
    }

    #[test]
    fn test_slots_start_on_placeholder() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let manager = TextureManager::new(&device, &queue, 3);
        assert_eq!(manager.slot_count(), 3);
        assert!(!manager.is_loaded(TextureHandle(0)));
        let bound = manager.get(TextureHandle(2));
        assert_eq!(bound.dimensions, (1, 1));
        assert!(std::ptr::eq(bound, manager.placeholder()));
    }

    #[test]
    fn test_mipmapped_upload() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device, &queue, 1);
        let data = vec![255u8; 256 * 256 * 4];
        let tex = manager
            .create_texture(&device, &queue, TextureHandle(0), "pot", &data, 256, 256)
            .unwrap();
        assert_eq!(tex.mip_level_count, 9);
        assert_eq!(tex.policy, SamplerPolicy::Mipmapped);
        assert!(manager.is_loaded(TextureHandle(0)));
        assert_eq!(manager.get(TextureHandle(0)).dimensions, (256, 256));
    }

    #[test]
    fn test_non_power_of_two_upload() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device, &queue, 1);
        let data = vec![0u8; 6 * 3 * 4];
        let tex = manager
            .create_texture(&device, &queue, TextureHandle(0), "npot", &data, 6, 3)
            .unwrap();
        assert_eq!(tex.mip_level_count, 1);
        assert_eq!(tex.policy, SamplerPolicy::ClampLinear);
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device, &queue, 1);
        let result =
            manager.create_texture(&device, &queue, TextureHandle(5), "x", &PLACEHOLDER_RGBA, 1, 1);
        assert!(matches!(result, Err(TextureError::UnknownSlot(5))));
    }
}
