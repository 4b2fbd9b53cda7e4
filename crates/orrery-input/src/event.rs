//! Platform-neutral input events and the per-frame queue that carries them.

use glam::Vec2;

/// Mouse buttons the camera cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button: pans the camera.
    Primary,
    /// Right button: rotates the camera.
    Secondary,
    /// Anything else is ignored.
    Other,
}

/// One input occurrence, in window pixel coordinates (origin top-left).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { button: PointerButton },
    /// Positive `delta_y` scrolls away from the scene (zooms out).
    Wheel { delta_y: f32, position: Vec2 },
    /// `touches` lists every finger currently down, in contact order.
    TouchStart { touches: Vec<Vec2> },
    TouchMove { touches: Vec<Vec2> },
    /// `touches` lists the fingers still down after the lift.
    TouchEnd { touches: Vec<Vec2> },
    Resize { width: u32, height: u32 },
    /// Pause/resume the orbital clock.
    TogglePause,
}

/// Whether the platform's default handling for an event should be suppressed.
///
/// Wheel scrolling, touch moves and the secondary-button context menu would
/// otherwise scroll, zoom or open menus on hosts that have such behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Default,
    PreventDefault,
}

/// Events collected between frames, drained in arrival order.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
