//! Drawing surface consumed by the simulation's redraw ticks.
//!
//! The engine only ever talks to a [`Canvas`]; windowing, double buffering and
//! frame presentation belong to whoever implements it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque RGB display attribute carried by each particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::RED
    }
}

/// A 2D drawing surface in arena coordinates.
pub trait Canvas {
    /// Erase the back buffer.
    fn clear(&mut self);
    /// Pen color for subsequent shapes.
    fn set_pen_color(&mut self, color: Color);
    /// Filled disc centred at `(x, y)`.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);
    /// Make everything drawn since the last `clear` visible.
    fn show(&mut self);
    /// Real-time delay used to pace playback.
    fn pause(&mut self, ms: u64);
    fn set_title(&mut self, title: &str);
}

/// Headless canvas: every call is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn clear(&mut self) {}
    fn set_pen_color(&mut self, _color: Color) {}
    fn fill_circle(&mut self, _x: f64, _y: f64, _radius: f64) {}
    fn show(&mut self) {}
    fn pause(&mut self, _ms: u64) {}
    fn set_title(&mut self, _title: &str) {}
}

/// Canvas that reports each presented frame through the `log` facade instead of a window.
///
/// Pacing sleeps the calling thread only when enabled with [`LogCanvas::with_pacing`].
#[derive(Debug, Default)]
pub struct LogCanvas {
    title: String,
    frames: u64,
    discs: usize,
    pacing: bool,
}

impl LogCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pacing(mut self, pacing: bool) -> Self {
        self.pacing = pacing;
        self
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Canvas for LogCanvas {
    fn clear(&mut self) {
        self.discs = 0;
    }

    fn set_pen_color(&mut self, _color: Color) {}

    fn fill_circle(&mut self, _x: f64, _y: f64, _radius: f64) {
        self.discs += 1;
    }

    fn show(&mut self) {
        self.frames += 1;
        log::debug!(
            "[{}] frame {} presented with {} discs",
            self.title,
            self.frames,
            self.discs
        );
    }

    fn pause(&mut self, ms: u64) {
        if self.pacing && ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}
