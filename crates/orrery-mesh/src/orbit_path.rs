//! Orbit circles drawn as closed polylines.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::error::{GeometryError, check_radius};

/// `segments + 1` points on a circle of `radius` in the XZ plane.
///
/// The last point repeats the first, so drawing the points as a strip
/// already closes the loop.
pub fn build_orbit_path(radius: f32, segments: u32) -> Result<Vec<Vec3>, GeometryError> {
    check_radius("orbit path", "radius", radius)?;
    if segments < 3 {
        return Err(GeometryError::invalid(
            "orbit path",
            format!("need at least 3 segments, got {segments}"),
        ));
    }

    Ok((0..=segments)
        .map(|i| {
            let (sin_a, cos_a) = (i as f32 / segments as f32 * TAU).sin_cos();
            Vec3::new(radius * cos_a, 0.0, radius * sin_a)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_path_is_closed() {
        let points = build_orbit_path(9.5, 100).unwrap();
        assert_eq!(points.len(), 101);
        let (first, last) = (points[0], points[100]);
        assert!(first.distance(last) < 1e-4, "{first} vs {last}");
    }

    #[test]
    fn test_orbit_points_on_circle() {
        let points = build_orbit_path(5.0, 32).unwrap();
        for p in points {
            assert_eq!(p.y, 0.0);
            assert!((p.length() - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_orbit_path_rejects_bad_params() {
        assert!(build_orbit_path(0.0, 100).is_err());
        assert!(build_orbit_path(-3.0, 100).is_err());
        assert!(build_orbit_path(3.0, 2).is_err());
    }
}
