//! Input-to-camera mapping.
//!
//! [`CameraController`] owns the [`CameraState`] and the gesture state
//! machine. Events are applied in queue order; timers (the touch-rotate grace
//! period) advance through [`CameraController::update`], so the controller
//! never reads the wall clock itself.

use std::time::{Duration, Instant};

use glam::{UVec2, Vec2};
use orrery_config::CameraConfig;
use tracing::{debug, trace};

use crate::camera::{CameraState, ZoomBounds};
use crate::event::{EventDisposition, InputEvent, PointerButton};
use crate::gesture::{DragMode, Gesture, pinch_distance};

/// Speeds and limits the controller applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTuning {
    pub move_speed: f32,
    pub pan_factor: f32,
    pub mouse_rotate_speed: f32,
    pub touch_rotate_speed: f32,
    pub wheel_zoom_speed: f32,
    pub pinch_zoom_speed: f32,
    pub zoom_bounds: ZoomBounds,
    pub touch_rotate_grace: Duration,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

impl From<&CameraConfig> for CameraTuning {
    fn from(config: &CameraConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            pan_factor: config.pan_factor,
            mouse_rotate_speed: config.mouse_rotate_speed,
            touch_rotate_speed: config.touch_rotate_speed,
            wheel_zoom_speed: config.wheel_zoom_speed,
            pinch_zoom_speed: config.pinch_zoom_speed,
            zoom_bounds: ZoomBounds {
                min: config.zoom_min,
                max: config.zoom_max,
            },
            touch_rotate_grace: Duration::from_millis(config.touch_rotate_grace_ms),
        }
    }
}

/// Turns queued input events into camera motion.
#[derive(Debug, Clone)]
pub struct CameraController {
    camera: CameraState,
    tuning: CameraTuning,
    gesture: Gesture,
    viewport: UVec2,
    touch_rotate_enabled: bool,
    reenable_touch_rotate_at: Option<Instant>,
}

impl CameraController {
    #[must_use]
    pub fn new(mut camera: CameraState, tuning: CameraTuning, viewport: UVec2) -> Self {
        camera.clamp_zoom(tuning.zoom_bounds);
        Self {
            camera,
            tuning,
            gesture: Gesture::Idle,
            viewport,
            touch_rotate_enabled: true,
            reenable_touch_rotate_at: None,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    #[must_use]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    #[must_use]
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    #[must_use]
    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    /// Whether a single finger may currently rotate the camera.
    #[must_use]
    pub fn touch_rotate_enabled(&self) -> bool {
        self.touch_rotate_enabled
    }

    /// Swap in new tuning (e.g. after a config reload) and re-clamp zoom.
    pub fn set_tuning(&mut self, tuning: CameraTuning) {
        self.tuning = tuning;
        self.camera.clamp_zoom(tuning.zoom_bounds);
    }

    // ── Frame processing ────────────────────────────────────────────

    /// Fire any timer that has expired by `now`.
    pub fn update(&mut self, now: Instant) {
        if let Some(deadline) = self.reenable_touch_rotate_at
            && now >= deadline
        {
            self.reenable_touch_rotate_at = None;
            self.touch_rotate_enabled = true;
            trace!("single-touch rotation re-enabled");
        }
    }

    /// Apply every event in order, then advance timers to `now`.
    pub fn apply_all<I>(&mut self, events: I, now: Instant)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        for event in events {
            let disposition = self.apply(&event, now);
            if disposition == EventDisposition::PreventDefault {
                trace!(?event, "default action suppressed");
            }
        }
        self.update(now);
    }

    /// Apply one event. `now` timestamps timers started by this event.
    pub fn apply(&mut self, event: &InputEvent, now: Instant) -> EventDisposition {
        let before = self.gesture;
        let disposition = match event {
            InputEvent::PointerDown { button, position } => {
                self.on_pointer_down(*button, *position)
            }
            InputEvent::PointerMove { position } => self.on_pointer_move(*position),
            InputEvent::PointerUp { .. } => self.on_pointer_up(),
            InputEvent::Wheel { delta_y, position } => self.on_wheel(*delta_y, *position),
            InputEvent::TouchStart { touches } => self.on_touch_start(touches),
            InputEvent::TouchMove { touches } => self.on_touch_move(touches),
            InputEvent::TouchEnd { touches } => self.on_touch_end(touches, now),
            InputEvent::Resize { width, height } => {
                self.viewport = UVec2::new(*width, *height);
                EventDisposition::Default
            }
            InputEvent::TogglePause => EventDisposition::Default,
        };
        if before.name() != self.gesture.name() {
            debug!(from = before.name(), to = self.gesture.name(), "gesture changed");
        }
        disposition
    }

    // ── Event handlers ──────────────────────────────────────────────

    fn on_pointer_down(&mut self, button: PointerButton, position: Vec2) -> EventDisposition {
        if !position.is_finite() {
            return EventDisposition::Default;
        }
        match button {
            PointerButton::Primary => {
                self.gesture = Gesture::Dragging {
                    mode: DragMode::Pan,
                    last: position,
                };
                EventDisposition::Default
            }
            PointerButton::Secondary => {
                self.gesture = Gesture::Dragging {
                    mode: DragMode::Rotate,
                    last: position,
                };
                // Secondary press would otherwise open a context menu.
                EventDisposition::PreventDefault
            }
            PointerButton::Other => EventDisposition::Default,
        }
    }

    fn on_pointer_move(&mut self, position: Vec2) -> EventDisposition {
        let Gesture::Dragging { mode, last } = self.gesture else {
            return EventDisposition::Default;
        };
        if !position.is_finite() {
            return EventDisposition::Default;
        }
        let delta = position - last;
        match mode {
            DragMode::Pan => {
                let k = self.tuning.move_speed * self.tuning.pan_factor;
                self.camera.pan.x += delta.x * k;
                self.camera.pan.y -= delta.y * k;
            }
            DragMode::Rotate => {
                self.camera.pitch -= delta.y * self.tuning.mouse_rotate_speed;
                self.camera.yaw += delta.x * self.tuning.mouse_rotate_speed;
                self.camera.wrap_angles();
            }
        }
        self.gesture = Gesture::Dragging {
            mode,
            last: position,
        };
        EventDisposition::Default
    }

    fn on_pointer_up(&mut self) -> EventDisposition {
        if matches!(self.gesture, Gesture::Dragging { .. }) {
            self.gesture = Gesture::Idle;
        }
        EventDisposition::Default
    }

    fn on_wheel(&mut self, delta_y: f32, position: Vec2) -> EventDisposition {
        if !delta_y.is_finite() {
            return EventDisposition::PreventDefault;
        }
        let step = delta_y * self.tuning.wheel_zoom_speed;

        // Drift toward the pointer so zoom converges on what is under it.
        if self.viewport.x > 0 && self.viewport.y > 0 && position.is_finite() {
            let size = self.viewport.as_vec2();
            let nx = position.x / size.x * 2.0 - 1.0;
            let ny = -(position.y / size.y * 2.0 - 1.0);
            self.camera.pan.x += nx * step;
            self.camera.pan.y += ny * step;
        }

        self.camera.zoom -= step;
        self.camera.clamp_zoom(self.tuning.zoom_bounds);
        EventDisposition::PreventDefault
    }

    fn on_touch_start(&mut self, touches: &[Vec2]) -> EventDisposition {
        // A valid contact supersedes any pending re-enable; a malformed one
        // leaves the timer running.
        match touches {
            [only] if only.is_finite() => {
                self.reenable_touch_rotate_at = None;
                self.touch_rotate_enabled = true;
                self.gesture = Gesture::SingleTouchRotate { anchor: *only };
            }
            [_, _, ..] => {
                self.reenable_touch_rotate_at = None;
                self.gesture = Gesture::Pinching {
                    last_distance: pinch_distance(touches),
                };
            }
            _ => {}
        }
        EventDisposition::Default
    }

    fn on_touch_move(&mut self, touches: &[Vec2]) -> EventDisposition {
        match (touches, self.gesture) {
            ([current], Gesture::SingleTouchRotate { anchor })
                if self.touch_rotate_enabled && current.is_finite() =>
            {
                let delta = *current - anchor;
                self.camera.pitch += delta.y * self.tuning.touch_rotate_speed;
                self.camera.yaw += delta.x * self.tuning.touch_rotate_speed;
                self.camera.wrap_angles();
                self.gesture = Gesture::SingleTouchRotate { anchor: *current };
            }
            ([_, _, ..], Gesture::Pinching { last_distance }) => {
                // Degenerate spacing: skip this frame, keep the last good value.
                if let Some(distance) = pinch_distance(touches) {
                    if let Some(last) = last_distance {
                        self.camera.zoom -= (last - distance) * self.tuning.pinch_zoom_speed;
                        self.camera.clamp_zoom(self.tuning.zoom_bounds);
                    }
                    self.gesture = Gesture::Pinching {
                        last_distance: Some(distance),
                    };
                }
            }
            _ => {}
        }
        EventDisposition::PreventDefault
    }

    fn on_touch_end(&mut self, remaining: &[Vec2], now: Instant) -> EventDisposition {
        match remaining {
            [] => {
                self.gesture = Gesture::Idle;
                self.touch_rotate_enabled = false;
                self.reenable_touch_rotate_at = Some(now + self.tuning.touch_rotate_grace);
            }
            // A finger left over from a pinch must not start rotating until it
            // is lifted and placed again.
            [_] => self.gesture = Gesture::Idle,
            _ => {
                if matches!(self.gesture, Gesture::Pinching { .. }) {
                    self.gesture = Gesture::Pinching {
                        last_distance: pinch_distance(remaining),
                    };
                }
            }
        }
        EventDisposition::Default
    }
}
