//! Latitude/longitude (UV) sphere generation.

use std::f32::consts::{PI, TAU};

use crate::error::{GeometryError, check_radius};
use crate::vertex_set::{VertexBufferSet, check_index_range};

/// Build a UV sphere of `radius` with `lat_bands` rings and `long_bands` slices.
///
/// Vertices run latitude-major from the north pole (`θ = 0`) to the south
/// pole (`θ = π`); each latitude row repeats its first vertex at `φ = 2π` so the
/// texture seam has distinct UVs. Yields `(lat_bands + 1)(long_bands + 1)`
/// vertices and `6 · lat_bands · long_bands` indices.
pub fn build_sphere(
    lat_bands: u32,
    long_bands: u32,
    radius: f32,
) -> Result<VertexBufferSet, GeometryError> {
    if lat_bands < 1 || long_bands < 1 {
        return Err(GeometryError::invalid(
            "sphere",
            format!("band counts must be at least 1, got {lat_bands}x{long_bands}"),
        ));
    }
    check_radius("sphere", "radius", radius)?;
    let row = u64::from(long_bands) + 1;
    check_index_range("sphere", (u64::from(lat_bands) + 1) * row)?;

    let vertex_count = ((lat_bands + 1) * (long_bands + 1)) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut tex_coords = Vec::with_capacity(vertex_count);

    for lat in 0..=lat_bands {
        let theta = lat as f32 * PI / lat_bands as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_bands {
            let phi = long as f32 * TAU / long_bands as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            positions.push([
                radius * cos_phi * sin_theta,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            ]);
            tex_coords.push([
                1.0 - long as f32 / long_bands as f32,
                1.0 - lat as f32 / lat_bands as f32,
            ]);
        }
    }

    let mut indices = Vec::with_capacity(6 * (lat_bands * long_bands) as usize);
    let row = long_bands + 1;
    for lat in 0..lat_bands {
        for long in 0..long_bands {
            // Both fit in u16: the vertex count was checked above.
            let first = (lat * row + long) as u16;
            let second = first + row as u16;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    Ok(VertexBufferSet::triangles(positions, tex_coords, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimitiveKind;

    #[test]
    fn test_sphere_counts_across_band_grid() {
        for lat in 1..=12 {
            for long in 1..=12 {
                let set = build_sphere(lat, long, 1.0).unwrap();
                assert_eq!(set.vertex_count(), ((lat + 1) * (long + 1)) as usize);
                assert_eq!(set.indices.len(), (6 * lat * long) as usize);
                assert_eq!(set.primitive_count, 6 * lat * long);
                assert_eq!(set.kind, PrimitiveKind::Triangles);
            }
        }
    }

    #[test]
    fn test_sphere_indices_in_bounds() {
        let set = build_sphere(30, 30, 3.0).unwrap();
        let n = set.vertex_count() as u16;
        for &idx in &set.indices {
            assert!(idx < n, "index {idx} out of bounds (vertex count = {n})");
        }
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let radius = 2.5;
        let set = build_sphere(20, 20, radius).unwrap();
        for p in &set.positions {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - radius).abs() < 1e-4, "vertex at distance {len}");
        }
    }

    #[test]
    fn test_sphere_poles_and_uvs() {
        let set = build_sphere(4, 8, 1.0).unwrap();
        // First vertex is the north pole with (u, v) = (1, 1).
        assert!((set.positions[0][1] - 1.0).abs() < 1e-6);
        assert_eq!(set.tex_coords[0], [1.0, 1.0]);
        // Last vertex is the south pole with (u, v) = (0, 0).
        let last = set.vertex_count() - 1;
        assert!((set.positions[last][1] + 1.0).abs() < 1e-6);
        assert_eq!(set.tex_coords[last], [0.0, 0.0]);
        for uv in &set.tex_coords {
            assert!((0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]));
        }
    }

    #[test]
    fn test_sphere_first_cell_winding() {
        let set = build_sphere(2, 3, 1.0).unwrap();
        // first = 0, second = long_bands + 1 = 4
        assert_eq!(&set.indices[..6], &[0, 4, 1, 4, 5, 1]);
    }

    #[test]
    fn test_sphere_rejects_bad_params() {
        assert!(build_sphere(0, 10, 1.0).is_err());
        assert!(build_sphere(10, 0, 1.0).is_err());
        assert!(build_sphere(10, 10, 0.0).is_err());
        assert!(build_sphere(10, 10, -1.0).is_err());
        assert!(build_sphere(10, 10, f32::NAN).is_err());
    }

    #[test]
    fn test_sphere_rejects_u16_overflow() {
        // 256 * 256 = 65536 vertices still fits, 257 * 256 does not.
        assert!(build_sphere(255, 255, 1.0).is_ok());
        assert!(matches!(
            build_sphere(256, 255, 1.0),
            Err(GeometryError::InvalidGeometryParams { shape: "sphere", .. })
        ));
    }
}
