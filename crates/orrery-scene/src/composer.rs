//! Per-frame scene composition.
//!
//! Every frame the composer builds one projection and, for each visible
//! drawable, a model-view matrix:
//!
//! ```text
//! base     = T(pan.x, pan.y, zoom + pan.z) · Rx(π) · S(1, 1, -1) · Rx(pitch) · Ry(yaw)
//! stars    = base · S(1, 1, -1)
//! orbits   = base
//! body     = parent_frame · Ry(orbit angle) · T(distance, 0, 0) [· Ry(spin)]
//! ```
//!
//! `Rx(π) · S(1, 1, -1)` is a fixed axis correction between the modelling
//! convention and the render convention. Spin only affects the body's own
//! draw matrix; children compose through the unspun frame.

use glam::{Mat4, Vec3};
use orrery_config::{RenderConfig, SimulationConfig};
use orrery_input::CameraState;
use orrery_mesh::PrimitiveKind;

use crate::catalog::{BodyId, BodyKind, GeometryHandle, SceneCatalog, TextureHandle, Visibility};
use crate::clock::SimulationState;
use crate::graph::SceneGraph;

/// Live drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a collapsed window counts as 1 pixel.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Projection and visibility parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposerSettings {
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    /// Outer bodies are drawn only while zoom is strictly below this.
    pub lod_zoom_threshold: f32,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default(), &SimulationConfig::default())
    }
}

impl ComposerSettings {
    #[must_use]
    pub fn from_config(render: &RenderConfig, simulation: &SimulationConfig) -> Self {
        Self {
            fov_y_radians: render.fov_y_degrees.to_radians(),
            near: render.near,
            far: render.far,
            lod_zoom_threshold: simulation.lod_zoom_threshold,
        }
    }
}

/// One draw call for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawSubmission {
    pub geometry: GeometryHandle,
    /// `None` for flat-colour orbit lines.
    pub texture: Option<TextureHandle>,
    pub model_view: Mat4,
    pub projection: Mat4,
    pub kind: PrimitiveKind,
    /// `None` for orbit paths.
    pub body: Option<BodyId>,
}

impl DrawSubmission {
    /// Column-major model-view matrix.
    #[must_use]
    pub fn model_view_array(&self) -> [f32; 16] {
        self.model_view.to_cols_array()
    }

    /// Column-major projection matrix.
    #[must_use]
    pub fn projection_array(&self) -> [f32; 16] {
        self.projection.to_cols_array()
    }
}

/// Camera transform shared by orbit paths and root-level bodies.
#[must_use]
pub fn base_view(camera: &CameraState) -> Mat4 {
    Mat4::from_translation(Vec3::new(camera.pan.x, camera.pan.y, camera.zoom + camera.pan.z))
        * Mat4::from_rotation_x(std::f32::consts::PI)
        * Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0))
        * Mat4::from_rotation_x(camera.pitch)
        * Mat4::from_rotation_y(camera.yaw)
}

/// Turns catalog + simulation + camera into [`DrawSubmission`]s.
#[derive(Debug, Clone)]
pub struct SceneComposer {
    settings: ComposerSettings,
    graph: SceneGraph,
    /// Graph node per body, by [`BodyId`] index.
    nodes: Vec<usize>,
    submissions: Vec<DrawSubmission>,
}

impl SceneComposer {
    #[must_use]
    pub fn new(catalog: &SceneCatalog, settings: ComposerSettings) -> Self {
        let mut graph = SceneGraph::new();
        let mut nodes = Vec::with_capacity(catalog.len());
        for body in catalog.bodies() {
            let parent = body.parent.map(|p| nodes[p.0]);
            nodes.push(graph.insert(parent));
        }
        Self {
            settings,
            graph,
            nodes,
            submissions: Vec::with_capacity(catalog.len() + catalog.orbit_paths().len()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ComposerSettings) {
        self.settings = settings;
    }

    /// Projection for the live viewport.
    #[must_use]
    pub fn projection(&self, viewport: Viewport) -> Mat4 {
        Mat4::perspective_rh(
            self.settings.fov_y_radians,
            viewport.aspect(),
            self.settings.near,
            self.settings.far,
        )
    }

    /// Whether a body with `visibility` is drawn at `zoom`.
    #[must_use]
    pub fn is_visible(&self, visibility: Visibility, zoom: f32) -> bool {
        match visibility {
            Visibility::Always => true,
            Visibility::ZoomedOut => zoom < self.settings.lod_zoom_threshold,
        }
    }

    /// Compose one frame: backdrop, orbit paths, then bodies in registration
    /// order, skipping those hidden by the zoom threshold (and their children).
    pub fn compose(
        &mut self,
        catalog: &SceneCatalog,
        state: &SimulationState,
        camera: &CameraState,
        viewport: Viewport,
    ) -> &[DrawSubmission] {
        let projection = self.projection(viewport);
        let base = base_view(camera);

        for body in catalog.bodies() {
            let local = match state.motion(body.id).orbit {
                Some(orbit) => {
                    Mat4::from_rotation_y(orbit.current_angle)
                        * Mat4::from_translation(Vec3::new(orbit.distance, 0.0, 0.0))
                }
                None => Mat4::IDENTITY,
            };
            self.graph.set_local(self.nodes[body.id.0], local);
        }
        self.graph.propagate(base);

        self.submissions.clear();

        for body in catalog.bodies().iter().filter(|b| b.kind == BodyKind::Backdrop) {
            self.submissions.push(DrawSubmission {
                geometry: body.geometry,
                texture: Some(body.texture),
                model_view: base * Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0)),
                projection,
                kind: catalog.geometry(body.geometry).kind,
                body: Some(body.id),
            });
        }

        for &path in catalog.orbit_paths() {
            self.submissions.push(DrawSubmission {
                geometry: path,
                texture: None,
                model_view: base,
                projection,
                kind: PrimitiveKind::LineLoop,
                body: None,
            });
        }

        let mut visible = vec![false; catalog.len()];
        for body in catalog.bodies() {
            let parent_visible = body.parent.is_none_or(|p| visible[p.0]);
            visible[body.id.0] = parent_visible && self.is_visible(body.visibility, camera.zoom);
            if body.kind == BodyKind::Backdrop || !visible[body.id.0] {
                continue;
            }

            let frame = self.graph.composed(self.nodes[body.id.0]);
            let model_view = match state.motion(body.id).spin {
                Some(spin) => frame * Mat4::from_rotation_y(spin.current_angle),
                None => frame,
            };
            self.submissions.push(DrawSubmission {
                geometry: body.geometry,
                texture: Some(body.texture),
                model_view,
                projection,
                kind: catalog.geometry(body.geometry).kind,
                body: Some(body.id),
            });
        }

        &self.submissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = ComposerSettings::default();
        assert!((s.fov_y_radians - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(s.near, 0.1);
        assert_eq!(s.far, 200.0);
        assert_eq!(s.lod_zoom_threshold, -10.0);
    }

    #[test]
    fn test_aspect_tracks_viewport() {
        let catalog = SceneCatalog::solar_system().unwrap();
        let composer = SceneComposer::new(&catalog, ComposerSettings::default());
        let wide = composer.projection(Viewport::new(1600, 800));
        let square = composer.projection(Viewport::new(800, 800));
        // x scale is f / aspect.
        assert!((wide.x_axis.x * 2.0 - square.x_axis.x).abs() < 1e-5);
        assert_eq!(wide.y_axis.y, square.y_axis.y);
    }

    #[test]
    fn test_zero_height_viewport_is_finite() {
        let catalog = SceneCatalog::solar_system().unwrap();
        let composer = SceneComposer::new(&catalog, ComposerSettings::default());
        assert!(composer.projection(Viewport::new(640, 0)).is_finite());
    }

    #[test]
    fn test_axis_correction_mirrors_y() {
        let view = base_view(&CameraState {
            zoom: 0.0,
            ..CameraState::default()
        });
        let p = view.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!(p.abs_diff_eq(Vec3::new(1.0, -2.0, 3.0), 1e-5));
    }

    #[test]
    fn test_base_view_translation() {
        let camera = CameraState {
            pan: Vec3::new(1.0, 2.0, 0.5),
            zoom: -20.0,
            ..CameraState::default()
        };
        let origin = base_view(&camera).transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(1.0, 2.0, -19.5), 1e-5));
    }

    #[test]
    fn test_visibility_threshold_is_strict() {
        let catalog = SceneCatalog::solar_system().unwrap();
        let composer = SceneComposer::new(&catalog, ComposerSettings::default());
        assert!(!composer.is_visible(Visibility::ZoomedOut, -10.0));
        assert!(composer.is_visible(Visibility::ZoomedOut, -10.01));
        assert!(composer.is_visible(Visibility::Always, -3.0));
    }
}
