//! Horizon viewer host shell.
//!
//! Window creation, event handling, the animation clock and the redraw loop
//! that drives a [`horizon_render::RenderSession`].

pub mod clock;
pub mod platform;
pub mod window;

pub use clock::{AnimationClock, FrameStats};
pub use platform::{PlatformDirs, PlatformError};
pub use window::{App, KeyAction, key_action, run, window_title};
