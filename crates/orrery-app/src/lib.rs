//! Orrery application: platform directories, the frame clock, the
//! per-frame session (input → clock → composition) and the winit window that
//! drives it.

pub mod frame_clock;
pub mod platform;
pub mod session;
pub mod window;

pub use frame_clock::{FrameClock, MAX_FRAME_TIME};
pub use platform::{PlatformDirs, PlatformError};
pub use session::Session;
pub use window::{AppError, AppState, run};
