//! Orbital clock: fixed angular speeds, advanced by elapsed time.

use std::f32::consts::TAU;

use crate::catalog::{BodyId, SceneCatalog};

/// Angles beyond this magnitude are folded back into `[0, 2π)`.
///
/// Below it an `f32` still resolves the angle to better than 1e-4 rad.
pub const ANGLE_NORMALIZE_THRESHOLD: f32 = 64.0 * TAU;

/// Position along a circular orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    pub distance: f32,
    pub angular_speed: f32,
    /// Radians.
    pub current_angle: f32,
}

/// Rotation of a body about its own Y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinParams {
    pub angular_speed: f32,
    pub current_angle: f32,
}

/// Mutable motion state of one body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyMotion {
    pub orbit: Option<OrbitParams>,
    pub spin: Option<SpinParams>,
}

/// All mutable simulation state, indexed by [`BodyId`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub paused: bool,
    motions: Vec<BodyMotion>,
}

impl SimulationState {
    /// Zero angles for every body in `catalog`.
    #[must_use]
    pub fn new(catalog: &SceneCatalog, paused: bool) -> Self {
        let motions = catalog
            .bodies()
            .iter()
            .map(|body| BodyMotion {
                orbit: body.orbit.map(|spec| OrbitParams {
                    distance: spec.distance,
                    angular_speed: spec.angular_speed,
                    current_angle: 0.0,
                }),
                spin: body.spin.map(|angular_speed| SpinParams {
                    angular_speed,
                    current_angle: 0.0,
                }),
            })
            .collect();
        Self { paused, motions }
    }

    #[must_use]
    pub fn motion(&self, id: BodyId) -> &BodyMotion {
        &self.motions[id.0]
    }

    pub fn motion_mut(&mut self, id: BodyId) -> &mut BodyMotion {
        &mut self.motions[id.0]
    }

    #[must_use]
    pub fn motions(&self) -> &[BodyMotion] {
        &self.motions
    }

    /// Flip pause and return the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

/// Advance every orbit and spin angle by `angular_speed · delta_time`.
///
/// Does nothing while paused. Negative or non-finite `delta_time` counts as
/// zero.
pub fn tick(state: &mut SimulationState, delta_time: f32) {
    if state.paused || !delta_time.is_finite() || delta_time <= 0.0 {
        return;
    }
    for motion in &mut state.motions {
        if let Some(orbit) = &mut motion.orbit {
            orbit.current_angle = advance(orbit.current_angle, orbit.angular_speed, delta_time);
        }
        if let Some(spin) = &mut motion.spin {
            spin.current_angle = advance(spin.current_angle, spin.angular_speed, delta_time);
        }
    }
}

fn advance(angle: f32, speed: f32, dt: f32) -> f32 {
    let next = angle + speed * dt;
    if next.abs() > ANGLE_NORMALIZE_THRESHOLD {
        next.rem_euclid(TAU)
    } else {
        next
    }
}
