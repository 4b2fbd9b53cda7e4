//! Flat annulus used for planetary ring systems.

use std::f32::consts::TAU;

use crate::error::{GeometryError, check_radius};
use crate::vertex_set::{VertexBufferSet, check_index_range};

/// Build a flat ring in the XZ plane between `inner_radius` and `outer_radius`.
///
/// Vertices come in (outer, inner) pairs for `i = 0..=segments`; outer
/// vertices get `v = 1`, inner vertices `v = 0`, and `u = i / segments`.
pub fn build_ring(
    inner_radius: f32,
    outer_radius: f32,
    segments: u32,
) -> Result<VertexBufferSet, GeometryError> {
    check_radius("ring", "inner_radius", inner_radius)?;
    check_radius("ring", "outer_radius", outer_radius)?;
    if inner_radius >= outer_radius {
        return Err(GeometryError::invalid(
            "ring",
            format!("inner radius {inner_radius} must be below outer radius {outer_radius}"),
        ));
    }
    if segments < 3 {
        return Err(GeometryError::invalid(
            "ring",
            format!("need at least 3 segments, got {segments}"),
        ));
    }
    check_index_range("ring", 2 * (u64::from(segments) + 1))?;

    let pairs = segments as usize + 1;
    let mut positions = Vec::with_capacity(pairs * 2);
    let mut tex_coords = Vec::with_capacity(pairs * 2);

    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let (sin_a, cos_a) = (t * TAU).sin_cos();

        positions.push([outer_radius * cos_a, 0.0, outer_radius * sin_a]);
        tex_coords.push([t, 1.0]);
        positions.push([inner_radius * cos_a, 0.0, inner_radius * sin_a]);
        tex_coords.push([t, 0.0]);
    }

    let mut indices = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let first = (2 * i) as u16;
        let (second, third, fourth) = (first + 1, first + 2, first + 3);
        indices.extend_from_slice(&[first, second, third]);
        indices.extend_from_slice(&[second, fourth, third]);
    }

    Ok(VertexBufferSet::triangles(positions, tex_coords, indices))
}
