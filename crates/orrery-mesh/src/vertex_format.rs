//! GPU vertex formats for body meshes and orbit lines.
//!
//! | Format           | Location | Offset | Attribute          |
//! |------------------|----------|--------|--------------------|
//! | `TexturedVertex` | 0        | 0      | position `Float32x3` |
//! | `TexturedVertex` | 1        | 12     | uv `Float32x2`       |
//! | `LineVertex`     | 0        | 0      | position `Float32x3` |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// Position + UV, used by every textured body and the ring.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Position only, used by orbit paths.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

pub const TEXTURED_VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 12,
        shader_location: 1,
    },
];

pub const LINE_VERTEX_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    format: VertexFormat::Float32x3,
    offset: 0,
    shader_location: 0,
}];

pub const TEXTURED_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TexturedVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TEXTURED_VERTEX_ATTRIBUTES,
};

pub const LINE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<LineVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &LINE_VERTEX_ATTRIBUTES,
};

const _: () = assert!(mem::size_of::<TexturedVertex>() == 20);
const _: () = assert!(mem::size_of::<LineVertex>() == 12);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textured_layout_stride() {
        assert_eq!(TEXTURED_VERTEX_LAYOUT.array_stride, 20);
        assert_eq!(TEXTURED_VERTEX_LAYOUT.attributes.len(), 2);
        assert_eq!(TEXTURED_VERTEX_ATTRIBUTES[1].offset, 12);
    }

    #[test]
    fn test_line_layout_stride() {
        assert_eq!(LINE_VERTEX_LAYOUT.array_stride, 12);
        assert_eq!(LINE_VERTEX_ATTRIBUTES[0].format, VertexFormat::Float32x3);
    }

    #[test]
    fn test_vertices_cast_to_bytes() {
        let verts = [TexturedVertex {
            position: [1.0, 2.0, 3.0],
            uv: [0.5, 0.25],
        }];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 20);
    }
}
