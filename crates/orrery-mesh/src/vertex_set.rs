//! CPU-side geometry produced by the builders and owned by the scene catalog.

use glam::Vec3;

use crate::error::GeometryError;
use crate::vertex_format::{LineVertex, TexturedVertex};

/// Largest vertex count addressable with `u16` indices.
pub const MAX_INDEXED_VERTICES: usize = u16::MAX as usize + 1;

/// How a [`VertexBufferSet`] is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Indexed triangle list.
    Triangles,
    /// Closed polyline through every vertex in order.
    LineLoop,
}

/// Positions, texture coordinates and indices for one drawable.
///
/// Immutable once built. `primitive_count` is the number of indices for
/// triangle sets and the number of vertices for line loops, which is exactly
/// the element count the renderer draws.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferSet {
    pub positions: Vec<[f32; 3]>,
    /// Empty for line loops.
    pub tex_coords: Vec<[f32; 2]>,
    /// Empty for line loops.
    pub indices: Vec<u16>,
    pub primitive_count: u32,
    pub kind: PrimitiveKind,
}

impl VertexBufferSet {
    /// Wrap an indexed triangle mesh.
    pub(crate) fn triangles(
        positions: Vec<[f32; 3]>,
        tex_coords: Vec<[f32; 2]>,
        indices: Vec<u16>,
    ) -> Self {
        debug_assert_eq!(positions.len(), tex_coords.len());
        let primitive_count = indices.len() as u32;
        Self {
            positions,
            tex_coords,
            indices,
            primitive_count,
            kind: PrimitiveKind::Triangles,
        }
    }

    /// Wrap a closed polyline such as the output of
    /// [`build_orbit_path`](crate::build_orbit_path).
    pub fn line_loop(points: &[Vec3]) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::invalid(
                "line loop",
                format!("need at least 2 points, got {}", points.len()),
            ));
        }
        if points.len() > MAX_INDEXED_VERTICES {
            return Err(GeometryError::invalid(
                "line loop",
                format!("{} points exceed the u16 index range", points.len()),
            ));
        }
        Ok(Self {
            positions: points.iter().map(|p| p.to_array()).collect(),
            tex_coords: Vec::new(),
            indices: Vec::new(),
            primitive_count: points.len() as u32,
            kind: PrimitiveKind::LineLoop,
        })
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Interleave positions and UVs for upload to a textured pipeline.
    #[must_use]
    pub fn textured_vertices(&self) -> Vec<TexturedVertex> {
        self.positions
            .iter()
            .zip(self.tex_coords.iter())
            .map(|(&position, &uv)| TexturedVertex { position, uv })
            .collect()
    }

    /// Positions only, for the flat line pipeline.
    #[must_use]
    pub fn line_vertices(&self) -> Vec<LineVertex> {
        self.positions
            .iter()
            .map(|&position| LineVertex { position })
            .collect()
    }
}

/// Fail when `count` vertices cannot be addressed with `u16` indices.
pub(crate) fn check_index_range(shape: &'static str, count: u64) -> Result<(), GeometryError> {
    if count > MAX_INDEXED_VERTICES as u64 {
        Err(GeometryError::invalid(
            shape,
            format!("{count} vertices exceed the u16 index range"),
        ))
    } else {
        Ok(())
    }
}
