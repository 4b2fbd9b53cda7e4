//! Gesture state machine states.

use glam::Vec2;

/// What a mouse drag does to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Pan,
    Rotate,
}

/// The interaction currently in progress.
///
/// ```text
/// Idle ──pointer down──▶ Dragging ──pointer up──▶ Idle
/// Idle ──two fingers───▶ Pinching ──all lifted──▶ Idle
/// Idle ──one finger────▶ SingleTouchRotate ──all lifted──▶ Idle (+ grace period)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging { mode: DragMode, last: Vec2 },
    /// `last_distance` is `None` until a usable finger spacing was seen.
    Pinching { last_distance: Option<f32> },
    SingleTouchRotate { anchor: Vec2 },
}

impl Gesture {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging {
                mode: DragMode::Pan,
                ..
            } => "drag-pan",
            Self::Dragging {
                mode: DragMode::Rotate,
                ..
            } => "drag-rotate",
            Self::Pinching { .. } => "pinch",
            Self::SingleTouchRotate { .. } => "touch-rotate",
        }
    }
}

/// Spacing between the first two fingers, or `None` when it cannot drive a
/// pinch (fewer than two touches, coincident or non-finite points).
#[must_use]
pub fn pinch_distance(touches: &[Vec2]) -> Option<f32> {
    let [a, b, ..] = touches else {
        return None;
    };
    let distance = a.distance(*b);
    (distance.is_finite() && distance > f32::EPSILON).then_some(distance)
}
