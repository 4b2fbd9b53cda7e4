//! Translation from winit window events into [`InputEvent`]s.
//!
//! winit reports touches one finger at a time and the cursor position
//! separately from button presses, so the adapter tracks both and emits
//! events in the shape the controller expects.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase};
use winit::keyboard::KeyCode;

use crate::event::{InputEvent, PointerButton};

/// Pixels one wheel notch is worth, matching what browsers report.
pub const PIXELS_PER_LINE: f32 = 100.0;

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

/// Stateful winit-to-[`InputEvent`] translator.
#[derive(Debug, Clone, Default)]
pub struct WindowInputAdapter {
    cursor: Vec2,
    /// Active touches as (finger id, position), in contact order.
    touches: Vec<(u64, Vec2)>,
}

impl WindowInputAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    #[must_use]
    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    fn touch_positions(&self) -> Vec<Vec2> {
        self.touches.iter().map(|&(_, p)| p).collect()
    }

    // ── Event handlers ──────────────────────────────────────────────

    /// Process a `CursorMoved` event.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) -> InputEvent {
        self.cursor = Vec2::new(x as f32, y as f32);
        InputEvent::PointerMove {
            position: self.cursor,
        }
    }

    /// Process a `MouseInput` event.
    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) -> InputEvent {
        let button = pointer_button(button);
        match state {
            ElementState::Pressed => InputEvent::PointerDown {
                button,
                position: self.cursor,
            },
            ElementState::Released => InputEvent::PointerUp { button },
        }
    }

    /// Process a `MouseWheel` event.
    ///
    /// winit reports scrolling away from the user as positive; the controller
    /// wants the opposite sign, in pixels.
    pub fn on_wheel(&mut self, delta: MouseScrollDelta) -> InputEvent {
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
            MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
        };
        InputEvent::Wheel {
            delta_y,
            position: self.cursor,
        }
    }

    /// Process a `Touch` event for finger `id`.
    ///
    /// Returns `None` for moves or lifts of a finger that never started.
    pub fn on_touch(&mut self, id: u64, phase: TouchPhase, x: f64, y: f64) -> Option<InputEvent> {
        let position = Vec2::new(x as f32, y as f32);
        let slot = self.touches.iter().position(|&(finger, _)| finger == id);
        match phase {
            TouchPhase::Started => {
                match slot {
                    Some(i) => self.touches[i].1 = position,
                    None => self.touches.push((id, position)),
                }
                Some(InputEvent::TouchStart {
                    touches: self.touch_positions(),
                })
            }
            TouchPhase::Moved => {
                self.touches[slot?].1 = position;
                Some(InputEvent::TouchMove {
                    touches: self.touch_positions(),
                })
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(slot?);
                Some(InputEvent::TouchEnd {
                    touches: self.touch_positions(),
                })
            }
        }
    }

    /// Process a `Resized` event.
    pub fn on_resize(&mut self, width: u32, height: u32) -> InputEvent {
        InputEvent::Resize { width, height }
    }

    /// Map a key press to the pause toggle (Space or P). Repeats are ignored.
    pub fn on_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) -> Option<InputEvent> {
        if state != ElementState::Pressed || repeat {
            return None;
        }
        matches!(key, KeyCode::Space | KeyCode::KeyP).then_some(InputEvent::TogglePause)
    }
}
