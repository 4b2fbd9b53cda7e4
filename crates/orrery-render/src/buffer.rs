//! Vertex and index buffer uploads for catalog geometry.

use orrery_mesh::{PrimitiveKind, VertexBufferSet};
use wgpu::util::DeviceExt;

/// A geometry resident on the GPU.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    /// `None` for line loops, which draw their vertices in order.
    pub index_buffer: Option<wgpu::Buffer>,
    /// Indices for triangle meshes, vertices for line loops.
    pub element_count: u32,
    pub kind: PrimitiveKind,
}

impl GpuMesh {
    /// Bind buffers and issue the draw.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(indices) => {
                render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..self.element_count, 0, 0..1);
            }
            None => render_pass.draw(0..self.element_count, 0..1),
        }
    }
}

/// Creates vertex and index buffers on a device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload one geometry. Triangle meshes get interleaved position+UV
    /// vertices and a `u16` index buffer; line loops get positions only.
    pub fn create_mesh(&self, label: &str, set: &VertexBufferSet) -> GpuMesh {
        match set.kind {
            PrimitiveKind::Triangles => {
                let vertices = set.textured_vertices();
                GpuMesh {
                    vertex_buffer: self.create_vertex_buffer(
                        &format!("{label}-vertices"),
                        bytemuck::cast_slice(&vertices),
                    ),
                    index_buffer: Some(
                        self.create_index_buffer(&format!("{label}-indices"), &set.indices),
                    ),
                    element_count: set.primitive_count,
                    kind: set.kind,
                }
            }
            PrimitiveKind::LineLoop => {
                let vertices = set.line_vertices();
                GpuMesh {
                    vertex_buffer: self.create_vertex_buffer(
                        &format!("{label}-vertices"),
                        bytemuck::cast_slice(&vertices),
                    ),
                    index_buffer: None,
                    element_count: set.primitive_count,
                    kind: set.kind,
                }
            }
        }
    }

    /// Upload every geometry, in handle order.
    pub fn create_meshes(&self, sets: &[VertexBufferSet]) -> Vec<GpuMesh> {
        let meshes: Vec<GpuMesh> = sets
            .iter()
            .enumerate()
            .map(|(i, set)| self.create_mesh(&format!("geometry-{i}"), set))
            .collect();
        log::info!("Uploaded {} geometries", meshes.len());
        meshes
    }

    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    /// `u16` index buffer, padded to the 4-byte copy alignment.
    pub fn create_index_buffer(&self, label: &str, data: &[u16]) -> wgpu::Buffer {
        let mut padded = data.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&padded),
                usage: wgpu::BufferUsages::INDEX,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::create_test_device_queue;
    use orrery_mesh::{build_orbit_path, build_ring, build_sphere};

    #[test]
    fn test_sphere_upload_sizes() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let sphere = build_sphere(30, 30, 1.0).unwrap();
        let mesh = BufferAllocator::new(&device).create_mesh("sphere", &sphere);
        assert_eq!(mesh.kind, PrimitiveKind::Triangles);
        assert_eq!(mesh.element_count, 30 * 30 * 6);
        assert_eq!(mesh.vertex_buffer.size(), 31 * 31 * 20);
        assert_eq!(
            mesh.index_buffer.as_ref().map(|b| b.size()),
            Some(30 * 30 * 6 * 2)
        );
    }

    #[test]
    fn test_orbit_path_has_no_index_buffer() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let points = build_orbit_path(9.5, 100).unwrap();
        let set = VertexBufferSet::line_loop(&points).unwrap();
        let mesh = BufferAllocator::new(&device).create_mesh("orbit", &set);
        assert!(mesh.index_buffer.is_none());
        assert_eq!(mesh.element_count, 101);
        assert_eq!(mesh.vertex_buffer.size(), 101 * 12);
    }

    #[test]
    fn test_create_meshes_keeps_order() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let sets = [
            build_ring(1.0, 2.0, 4).unwrap(),
            build_sphere(1, 1, 1.0).unwrap(),
        ];
        let meshes = BufferAllocator::new(&device).create_meshes(&sets);
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes[0].element_count, 24);
        assert_eq!(meshes[1].element_count, 6);
    }
}
