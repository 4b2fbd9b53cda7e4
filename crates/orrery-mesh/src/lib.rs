//! Procedural geometry for the orrery: UV spheres, ring annuli and orbit
//! circles, plus the GPU vertex formats they are uploaded with.

mod error;
pub mod orbit_path;
pub mod ring;
pub mod sphere;
pub mod vertex_format;
pub mod vertex_set;

pub use error::GeometryError;
pub use orbit_path::build_orbit_path;
pub use ring::build_ring;
pub use sphere::build_sphere;
pub use vertex_format::{
    LINE_VERTEX_LAYOUT, LineVertex, TEXTURED_VERTEX_LAYOUT, TexturedVertex,
};
pub use vertex_set::{MAX_INDEXED_VERTICES, PrimitiveKind, VertexBufferSet};
