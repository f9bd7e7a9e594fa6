//! Platform abstraction layer
//!
//! The simulation never owns a window. It talks to:
//! - a `DisplaySurface` that hands out one `Canvas` per frame
//! - a `Keyboard` buffer that input callbacks write into from any thread
//!
//! `HeadlessSurface` records draw calls so the loop can run without a
//! window system (CLI runs, tests).

pub mod input;
pub mod surface;

pub use input::{Key, Keyboard, KeySnapshot};
pub use surface::{Canvas, Color, DisplaySurface, DrawCommand, HeadlessSurface, Rect};
