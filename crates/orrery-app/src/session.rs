//! One running orrery: catalog, orbital clock, camera and composer, stepped
//! once per frame.
//!
//! Window callbacks push [`InputEvent`]s; [`Session::frame`] drains them,
//! advances the simulation by the elapsed time and composes the frame's draw
//! list. Nothing here touches the GPU.

use std::path::{Path, PathBuf};
use std::time::Instant;

use glam::UVec2;
use orrery_config::Config;
use orrery_input::{CameraController, CameraState, CameraTuning, InputEvent, InputQueue};
use orrery_scene::{
    CatalogError, ComposerSettings, DrawSubmission, SceneCatalog, SceneComposer,
    SimulationState, TextureHandle, Viewport, tick,
};
use tracing::info;

pub struct Session {
    catalog: SceneCatalog,
    simulation: SimulationState,
    composer: SceneComposer,
    controller: CameraController,
    input: InputQueue,
    viewport: Viewport,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, CatalogError> {
        let catalog = SceneCatalog::solar_system()?;
        Ok(Self::with_catalog(catalog, config))
    }

    pub fn with_catalog(catalog: SceneCatalog, config: &Config) -> Self {
        let viewport = Viewport::new(config.window.width, config.window.height);
        let simulation = SimulationState::new(&catalog, config.simulation.start_paused);
        let composer = SceneComposer::new(
            &catalog,
            ComposerSettings::from_config(&config.render, &config.simulation),
        );
        let controller = CameraController::new(
            CameraState::from_config(&config.camera),
            CameraTuning::from(&config.camera),
            UVec2::new(viewport.width, viewport.height),
        );
        Self {
            catalog,
            simulation,
            composer,
            controller,
            input: InputQueue::new(),
            viewport,
        }
    }

    /// Queue an event for the next frame.
    pub fn push(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Apply queued input, advance the clock by `delta_time` seconds and
    /// compose the frame.
    pub fn frame(&mut self, now: Instant, delta_time: f32) -> &[DrawSubmission] {
        let events = self.input.drain();
        for event in &events {
            match event {
                InputEvent::TogglePause => {
                    let paused = self.simulation.toggle_pause();
                    info!(paused, "simulation clock toggled");
                }
                InputEvent::Resize { width, height } => {
                    self.viewport = Viewport::new(*width, *height);
                }
                _ => {}
            }
        }
        self.controller.apply_all(events, now);

        tick(&mut self.simulation, delta_time);

        self.composer.compose(
            &self.catalog,
            &self.simulation,
            self.controller.camera(),
            self.viewport,
        )
    }

    /// Take camera tuning, projection and zoom gating from `config`.
    /// Camera pose, clock and viewport carry over.
    pub fn apply_config(&mut self, config: &Config) {
        self.controller.set_tuning(CameraTuning::from(&config.camera));
        self.composer.set_settings(ComposerSettings::from_config(
            &config.render,
            &config.simulation,
        ));
    }

    /// Every texture the scene uses, resolved against `texture_dir`.
    pub fn texture_requests(&self, texture_dir: &Path) -> Vec<(TextureHandle, PathBuf)> {
        self.catalog
            .textures()
            .iter()
            .map(|asset| (asset.handle, texture_dir.join(asset.file_name)))
            .collect()
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    pub fn simulation(&self) -> &SimulationState {
        &self.simulation
    }

    pub fn camera(&self) -> &CameraState {
        self.controller.camera()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_paused(&self) -> bool {
        self.simulation.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use orrery_input::PointerButton;
    use orrery_scene::BodyKind;

    fn session() -> Session {
        Session::new(&Config::default()).unwrap()
    }

    fn earth_angle(session: &Session) -> f32 {
        let earth = session.catalog().find("earth").unwrap();
        session.simulation().motion(earth).orbit.unwrap().current_angle
    }

    #[test]
    fn test_first_frame_draws_backdrop_first() {
        let mut s = session();
        let draws = s.frame(Instant::now(), 0.0).to_vec();
        assert!(!draws.is_empty());
        let first = draws[0].body.map(|id| s.catalog().body(id).kind);
        assert_eq!(first, Some(BodyKind::Backdrop));
    }

    #[test]
    fn test_clock_advances_with_elapsed_time() {
        let mut s = session();
        let before = earth_angle(&s);
        s.frame(Instant::now(), 0.5);
        assert!(earth_angle(&s) > before);
    }

    #[test]
    fn test_toggle_pause_freezes_orbits() {
        let mut s = session();
        assert!(!s.is_paused());
        s.push(InputEvent::TogglePause);
        s.frame(Instant::now(), 0.0);
        assert!(s.is_paused());

        let frozen = earth_angle(&s);
        s.frame(Instant::now(), 0.25);
        assert_eq!(earth_angle(&s), frozen);

        s.push(InputEvent::TogglePause);
        s.frame(Instant::now(), 0.25);
        assert!(!s.is_paused());
        assert!(earth_angle(&s) > frozen);
    }

    #[test]
    fn test_start_paused_from_config() {
        let mut config = Config::default();
        config.simulation.start_paused = true;
        let mut s = Session::new(&config).unwrap();
        let before = earth_angle(&s);
        s.frame(Instant::now(), 0.25);
        assert_eq!(earth_angle(&s), before);
    }

    #[test]
    fn test_resize_updates_viewport_and_projection() {
        let mut s = session();
        let wide = s.frame(Instant::now(), 0.0)[0].projection;
        s.push(InputEvent::Resize {
            width: 400,
            height: 800,
        });
        let tall = s.frame(Instant::now(), 0.0)[0].projection;
        assert_eq!(s.viewport(), Viewport::new(400, 800));
        assert_ne!(wide, tall);
    }

    #[test]
    fn test_wheel_reaches_camera() {
        let mut s = session();
        let zoom = s.camera().zoom;
        s.push(InputEvent::Wheel {
            delta_y: 1.0,
            position: Vec2::new(640.0, 360.0),
        });
        s.frame(Instant::now(), 0.0);
        assert!(s.camera().zoom < zoom);
    }

    #[test]
    fn test_pointer_drag_rotates_camera() {
        let mut s = session();
        let now = Instant::now();
        s.push(InputEvent::PointerDown {
            button: PointerButton::Secondary,
            position: Vec2::new(100.0, 100.0),
        });
        s.push(InputEvent::PointerMove {
            position: Vec2::new(140.0, 120.0),
        });
        s.push(InputEvent::PointerUp {
            button: PointerButton::Secondary,
        });
        s.frame(now, 0.0);
        let camera = s.camera();
        assert!(camera.yaw != 0.0 || camera.pitch != 0.0);
    }

    #[test]
    fn test_applied_config_changes_lod_gate() {
        let mut s = session();
        let near = s.frame(Instant::now(), 0.0).len();

        let mut config = Config::default();
        config.simulation.lod_zoom_threshold = 0.0;
        s.apply_config(&config);
        let far = s.frame(Instant::now(), 0.0).len();
        assert!(far > near, "{far} draws vs {near}");
    }

    #[test]
    fn test_applied_config_reclamps_zoom() {
        let mut s = session();
        assert_eq!(s.camera().zoom, -3.0);

        let mut config = Config::default();
        config.camera.zoom_max = -20.0;
        s.apply_config(&config);
        assert_eq!(s.camera().zoom, -20.0);

        s.push(InputEvent::Wheel {
            delta_y: -100.0,
            position: Vec2::new(640.0, 360.0),
        });
        s.frame(Instant::now(), 0.0);
        assert_eq!(s.camera().zoom, -20.0);
    }

    #[test]
    fn test_texture_requests_cover_catalog() {
        let s = session();
        let requests = s.texture_requests(Path::new("assets"));
        assert_eq!(requests.len(), s.catalog().textures().len());
        for ((handle, path), asset) in requests.iter().zip(s.catalog().textures()) {
            assert_eq!(*handle, asset.handle);
            assert_eq!(path, &Path::new("assets").join(asset.file_name));
        }
    }
}
