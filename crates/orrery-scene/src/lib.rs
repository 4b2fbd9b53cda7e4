//! The solar-system scene: static catalog, orbital clock, transform graph,
//! per-frame composition and the dispatch seam to a renderer.
//!
//! Frame order: the clock advances [`SimulationState`], the
//! [`SceneComposer`] turns camera + simulation state into
//! [`DrawSubmission`]s, and [`dispatch`] hands them to a [`RenderBackend`].

pub mod catalog;
pub mod clock;
pub mod composer;
pub mod dispatch;
pub mod graph;


pub use catalog::{
    BodyDefinition, BodyId, BodyKind, CatalogError, CelestialBody, GeometryHandle, OrbitSpec,
    SOLAR_SYSTEM, SceneCatalog, Shape, TextureAsset, TextureHandle, Visibility,
};
pub use clock::{BodyMotion, OrbitParams, SimulationState, SpinParams, tick};
pub use composer::{ComposerSettings, DrawSubmission, SceneComposer, Viewport};
pub use dispatch::{RecordingBackend, RenderBackend, dispatch};
pub use graph::SceneGraph;
