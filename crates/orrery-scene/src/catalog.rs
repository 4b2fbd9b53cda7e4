//! Static registry of celestial bodies.
//!
//! Bodies, their geometry and their texture slots are created once at startup
//! from [`SOLAR_SYSTEM`] and never change afterwards. Geometry is owned here;
//! everything else refers to it through [`GeometryHandle`]s.

use orrery_mesh::{GeometryError, VertexBufferSet, build_orbit_path, build_ring, build_sphere};
use tracing::debug;

/// Segments used for every orbit circle.
pub const ORBIT_PATH_SEGMENTS: u32 = 100;

/// Index of a body in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

/// Index into [`SceneCatalog::geometries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u32);

/// Index into [`SceneCatalog::textures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// The starfield sphere surrounding the camera.
    Backdrop,
    Star,
    Planet,
    Moon,
    Ring,
}

/// When a body is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Always,
    /// Only while the camera is zoomed out past the LOD threshold.
    ZoomedOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32, bands: u32 },
    Ring { inner: f32, outer: f32, segments: u32 },
}

/// Circular orbit around the parent (or the world origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSpec {
    pub distance: f32,
    /// Radians per second.
    pub angular_speed: f32,
}

/// Static description of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDefinition {
    pub name: &'static str,
    pub kind: BodyKind,
    pub shape: Shape,
    /// Texture file name, relative to the texture directory.
    pub texture: &'static str,
    pub parent: Option<&'static str>,
    pub visibility: Visibility,
    pub orbit: Option<OrbitSpec>,
    /// Axial spin in radians per second.
    pub spin: Option<f32>,
}

const fn planet(
    name: &'static str,
    radius: f32,
    bands: u32,
    distance: f32,
    angular_speed: f32,
) -> BodyDefinition {
    BodyDefinition {
        name,
        kind: BodyKind::Planet,
        shape: Shape::Sphere { radius, bands },
        texture: "",
        parent: None,
        visibility: Visibility::ZoomedOut,
        orbit: Some(OrbitSpec {
            distance,
            angular_speed,
        }),
        spin: None,
    }
}

const fn textured(def: BodyDefinition, texture: &'static str) -> BodyDefinition {
    BodyDefinition { texture, ..def }
}

/// The solar system, in registration (and therefore draw) order.
pub const SOLAR_SYSTEM: [BodyDefinition; 12] = [
    BodyDefinition {
        name: "stars",
        kind: BodyKind::Backdrop,
        shape: Shape::Sphere {
            radius: 100.0,
            bands: 30,
        },
        texture: "stars_milky_way.jpg",
        parent: None,
        visibility: Visibility::Always,
        orbit: None,
        spin: None,
    },
    BodyDefinition {
        visibility: Visibility::Always,
        spin: Some(0.5),
        ..textured(planet("earth", 1.0, 30, 9.5, 1.0), "earth.jpg")
    },
    BodyDefinition {
        name: "moon",
        kind: BodyKind::Moon,
        shape: Shape::Sphere {
            radius: 0.3,
            bands: 20,
        },
        texture: "moon.jpg",
        parent: Some("earth"),
        visibility: Visibility::Always,
        orbit: Some(OrbitSpec {
            distance: 2.0,
            angular_speed: 2.5,
        }),
        spin: Some(1.0),
    },
    BodyDefinition {
        name: "sun",
        kind: BodyKind::Star,
        shape: Shape::Sphere {
            radius: 3.0,
            bands: 30,
        },
        texture: "sun.jpg",
        parent: None,
        visibility: Visibility::ZoomedOut,
        orbit: None,
        spin: None,
    },
    textured(planet("mercury", 0.5, 20, 5.0, 1.6), "mercury.jpg"),
    textured(planet("venus", 0.9, 30, 6.7, 1.2), "venus.jpg"),
    textured(planet("mars", 0.7, 20, 12.0, 0.8), "mars.jpg"),
    textured(planet("jupiter", 2.0, 30, 15.0, 0.4), "jupiter.jpg"),
    textured(planet("saturn", 1.8, 30, 20.8, 0.3), "saturn.jpg"),
    BodyDefinition {
        name: "saturn_ring",
        kind: BodyKind::Ring,
        shape: Shape::Ring {
            inner: 2.2,
            outer: 3.5,
            segments: 64,
        },
        texture: "saturn_rings.jpg",
        parent: Some("saturn"),
        visibility: Visibility::ZoomedOut,
        orbit: None,
        spin: None,
    },
    textured(planet("uranus", 1.6, 30, 26.0, 0.2), "uranus.jpg"),
    textured(planet("neptune", 1.5, 30, 30.0, 0.1), "neptune.jpg"),
];

/// A registered body.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub id: BodyId,
    pub name: &'static str,
    pub kind: BodyKind,
    pub geometry: GeometryHandle,
    pub texture: TextureHandle,
    /// Always registered before this body.
    pub parent: Option<BodyId>,
    pub visibility: Visibility,
    pub orbit: Option<OrbitSpec>,
    pub spin: Option<f32>,
}

/// A texture the renderer should load for some body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureAsset {
    pub handle: TextureHandle,
    pub file_name: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to build geometry for `{body}`: {source}")]
    Geometry {
        body: &'static str,
        #[source]
        source: GeometryError,
    },
    /// Parents must be registered before their children.
    #[error("`{body}` names parent `{parent}` which is not registered before it")]
    UnknownParent {
        body: &'static str,
        parent: &'static str,
    },
    #[error("body name `{0}` is registered twice")]
    DuplicateName(&'static str),
}

/// Every body, its geometry, texture slots and the orbit circles.
#[derive(Debug, Clone)]
pub struct SceneCatalog {
    bodies: Vec<CelestialBody>,
    geometries: Vec<VertexBufferSet>,
    textures: Vec<TextureAsset>,
    orbit_paths: Vec<GeometryHandle>,
}

impl SceneCatalog {
    /// The built-in solar system.
    pub fn solar_system() -> Result<Self, CatalogError> {
        Self::from_definitions(&SOLAR_SYSTEM)
    }

    /// Build geometry and texture slots for `definitions`, in order.
    ///
    /// Every root-level body with an orbit also gets an orbit circle; circles
    /// are ordered by increasing distance.
    pub fn from_definitions(definitions: &[BodyDefinition]) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            bodies: Vec::with_capacity(definitions.len()),
            geometries: Vec::with_capacity(definitions.len() * 2),
            textures: Vec::new(),
            orbit_paths: Vec::new(),
        };

        for def in definitions {
            if catalog.find(def.name).is_some() {
                return Err(CatalogError::DuplicateName(def.name));
            }
            let parent = match def.parent {
                Some(parent) => Some(catalog.find(parent).ok_or(CatalogError::UnknownParent {
                    body: def.name,
                    parent,
                })?),
                None => None,
            };

            let geometry = match def.shape {
                Shape::Sphere { radius, bands } => build_sphere(bands, bands, radius),
                Shape::Ring {
                    inner,
                    outer,
                    segments,
                } => build_ring(inner, outer, segments),
            }
            .map_err(|source| CatalogError::Geometry {
                body: def.name,
                source,
            })?;

            let body = CelestialBody {
                id: BodyId(catalog.bodies.len()),
                name: def.name,
                kind: def.kind,
                geometry: catalog.push_geometry(geometry),
                texture: catalog.texture_slot(def.texture),
                parent,
                visibility: def.visibility,
                orbit: def.orbit,
                spin: def.spin,
            };
            debug!(body = body.name, id = body.id.0, "registered body");
            catalog.bodies.push(body);
        }

        let mut circles: Vec<(&'static str, f32)> = definitions
            .iter()
            .filter(|def| def.parent.is_none())
            .filter_map(|def| def.orbit.map(|orbit| (def.name, orbit.distance)))
            .collect();
        circles.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (name, distance) in circles {
            let path = build_orbit_path(distance, ORBIT_PATH_SEGMENTS)
                .and_then(|points| VertexBufferSet::line_loop(&points))
                .map_err(|source| CatalogError::Geometry { body: name, source })?;
            let handle = catalog.push_geometry(path);
            catalog.orbit_paths.push(handle);
        }

        Ok(catalog)
    }

    fn push_geometry(&mut self, geometry: VertexBufferSet) -> GeometryHandle {
        self.geometries.push(geometry);
        GeometryHandle(self.geometries.len() as u32 - 1)
    }

    /// Bodies sharing a file share a texture slot.
    fn texture_slot(&mut self, file_name: &'static str) -> TextureHandle {
        if let Some(existing) = self.textures.iter().find(|t| t.file_name == file_name) {
            return existing.handle;
        }
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(TextureAsset { handle, file_name });
        handle
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().find(|b| b.name == name).map(|b| b.id)
    }

    #[must_use]
    pub fn body(&self, id: BodyId) -> &CelestialBody {
        &self.bodies[id.0]
    }

    #[must_use]
    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    #[must_use]
    pub fn geometry(&self, handle: GeometryHandle) -> &VertexBufferSet {
        &self.geometries[handle.0 as usize]
    }

    /// All geometry, indexable by [`GeometryHandle`].
    #[must_use]
    pub fn geometries(&self) -> &[VertexBufferSet] {
        &self.geometries
    }

    #[must_use]
    pub fn textures(&self) -> &[TextureAsset] {
        &self.textures
    }

    #[must_use]
    pub fn orbit_paths(&self) -> &[GeometryHandle] {
        &self.orbit_paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_mesh::PrimitiveKind;

    #[test]
    fn test_solar_system_registration_order() {
        let catalog = SceneCatalog::solar_system().unwrap();
        let names: Vec<_> = catalog.bodies().iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            [
                "stars",
                "earth",
                "moon",
                "sun",
                "mercury",
                "venus",
                "mars",
                "jupiter",
                "saturn",
                "saturn_ring",
                "uranus",
                "neptune"
            ]
        );
    }

    #[test]
    fn test_hierarchy() {
        let catalog = SceneCatalog::solar_system().unwrap();
        let earth = catalog.find("earth").unwrap();
        let saturn = catalog.find("saturn").unwrap();
        let moon = catalog.body(catalog.find("moon").unwrap());
        let ring = catalog.body(catalog.find("saturn_ring").unwrap());
        assert_eq!(moon.parent, Some(earth));
        assert_eq!(ring.parent, Some(saturn));
        assert!(catalog.body(earth).parent.is_none());
    }

    #[test]
    fn test_eight_orbit_paths_by_distance() {
        let catalog = SceneCatalog::solar_system().unwrap();
        assert_eq!(catalog.orbit_paths().len(), 8);
        let radii: Vec<f32> = catalog
            .orbit_paths()
            .iter()
            .map(|&h| {
                let set = catalog.geometry(h);
                assert_eq!(set.kind, PrimitiveKind::LineLoop);
                assert_eq!(set.primitive_count, ORBIT_PATH_SEGMENTS + 1);
                let p = set.positions[0];
                (p[0] * p[0] + p[2] * p[2]).sqrt()
            })
            .collect();
        let expected = [5.0, 6.7, 9.5, 12.0, 15.0, 20.8, 26.0, 30.0];
        for (r, e) in radii.iter().zip(expected) {
            assert!((r - e).abs() < 1e-4, "{r} != {e}");
        }
    }

    #[test]
    fn test_every_body_has_own_geometry_and_texture() {
        let catalog = SceneCatalog::solar_system().unwrap();
        assert_eq!(catalog.textures().len(), 12);
        let handles: std::collections::HashSet<u32> =
            catalog.bodies().iter().map(|b| b.geometry.0).collect();
        assert_eq!(handles.len(), 12);
        assert_eq!(catalog.geometries().len(), 12 + 8);
    }

    #[test]
    fn test_sphere_sizes_follow_definitions() {
        let catalog = SceneCatalog::solar_system().unwrap();
        let moon = catalog.body(catalog.find("moon").unwrap());
        let set = catalog.geometry(moon.geometry);
        assert_eq!(set.vertex_count(), 21 * 21);
        let ring = catalog.body(catalog.find("saturn_ring").unwrap());
        assert_eq!(catalog.geometry(ring.geometry).vertex_count(), 2 * 65);
    }

    #[test]
    fn test_parent_must_precede_child() {
        let defs = [
            BodyDefinition {
                parent: Some("earth"),
                ..textured(planet("moon", 0.3, 8, 2.0, 1.0), "moon.jpg")
            },
            textured(planet("earth", 1.0, 8, 9.5, 1.0), "earth.jpg"),
        ];
        assert!(matches!(
            SceneCatalog::from_definitions(&defs),
            Err(CatalogError::UnknownParent { body: "moon", parent: "earth" })
        ));
    }

    #[test]
    fn test_invalid_geometry_fails_startup() {
        let defs = [textured(planet("broken", 0.0, 8, 5.0, 1.0), "x.jpg")];
        assert!(matches!(
            SceneCatalog::from_definitions(&defs),
            Err(CatalogError::Geometry { body: "broken", .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let def = textured(planet("io", 0.2, 8, 3.0, 1.0), "io.jpg");
        assert!(matches!(
            SceneCatalog::from_definitions(&[def, def]),
            Err(CatalogError::DuplicateName("io"))
        ));
    }

    #[test]
    fn test_shared_texture_file_shares_slot() {
        let a = textured(planet("a", 1.0, 4, 3.0, 1.0), "rock.jpg");
        let b = textured(planet("b", 1.0, 4, 4.0, 1.0), "rock.jpg");
        let catalog = SceneCatalog::from_definitions(&[a, b]).unwrap();
        assert_eq!(catalog.textures().len(), 1);
        assert_eq!(catalog.bodies()[0].texture, catalog.bodies()[1].texture);
    }
}
