//! Orbit camera state.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use orrery_config::CameraConfig;

/// Allowed zoom range. Zoom is negative: `min` is the farthest distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f32,
    pub max: f32,
}

impl ZoomBounds {
    #[must_use]
    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min, self.max)
    }

    #[must_use]
    pub fn contains(&self, zoom: f32) -> bool {
        (self.min..=self.max).contains(&zoom)
    }
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min: -100.0,
            max: -3.0,
        }
    }
}

/// Where the camera is and how it is turned.
///
/// `pan` offsets the whole scene, `zoom` is the distance along the view axis
/// (added to `pan.z`), `pitch` turns about X and `yaw` about Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub pan: Vec3,
    pub zoom: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            pan: Vec3::ZERO,
            zoom: -3.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

impl CameraState {
    /// Starting camera for the given tuning.
    #[must_use]
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            zoom: config.clamped_initial_zoom(),
            ..Self::default()
        }
    }

    /// Pull `zoom` back into `bounds`. Applying it twice changes nothing.
    pub fn clamp_zoom(&mut self, bounds: ZoomBounds) {
        self.zoom = bounds.clamp(self.zoom);
    }

    /// Keep `pitch` and `yaw` in `[-π, π)`; the view only consumes them
    /// through sin/cos, so this never changes the image.
    pub fn wrap_angles(&mut self) {
        self.pitch = wrap_angle(self.pitch);
        self.yaw = wrap_angle(self.yaw);
    }
}

fn wrap_angle(angle: f32) -> f32 {
    if (-PI..PI).contains(&angle) {
        angle
    } else {
        (angle + PI).rem_euclid(TAU) - PI
    }
}
