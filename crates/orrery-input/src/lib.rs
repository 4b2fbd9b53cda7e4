//! Pointer, wheel and touch input turned into orbit-camera state.
//!
//! Window callbacks only enqueue [`InputEvent`]s. Once per frame the queue is
//! drained into the [`CameraController`], which runs the gesture state machine
//! and mutates the [`CameraState`].

pub mod camera;
pub mod controller;
pub mod event;
pub mod gesture;
pub mod window_adapter;

pub use camera::{CameraState, ZoomBounds};
pub use controller::{CameraController, CameraTuning};
pub use event::{EventDisposition, InputEvent, InputQueue, PointerButton};
pub use gesture::{DragMode, Gesture};
pub use window_adapter::WindowInputAdapter;
