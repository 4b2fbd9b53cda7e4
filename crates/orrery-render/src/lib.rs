//! wgpu renderer for the orrery: device and surface setup, mesh and texture
//! uploads, the two scene pipelines, and the draw backend fed by the composer.

pub mod backend;
pub mod buffer;
pub mod depth;
pub mod gpu;
pub mod pipeline;
pub mod shader;
pub mod texture;
pub mod texture_loader;

pub use backend::{RenderError, SceneRenderer};
pub use buffer::{BufferAllocator, GpuMesh};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pipeline::{
    DrawUniforms, LINE_SHADER_SOURCE, ScenePipelines, TEXTURED_SHADER_SOURCE,
};
pub use shader::{ShaderError, ShaderLibrary};
pub use texture::{ManagedTexture, SamplerPolicy, TextureError, TextureManager};
pub use texture_loader::{DecodedImage, LoadedTexture, TextureLoadError, TextureLoader};
