//! collisim - event-driven simulation of elastic hard discs in a 2D box.
//!
//! Time advances from one predicted collision to the next instead of in fixed steps.
//! Predictions are stamped with the bounce counters of their participants and checked
//! when popped, so a collision never has to search the queue for the events it
//! invalidated.
//!
//! - `core`: particles, events, the priority queue and the simulation loop
//! - `render`: the drawing surface used by redraw ticks
//! - `config`: construction parameters

pub mod config;
pub mod core;
pub mod error;
pub mod render;

pub use crate::config::SimConfig;
pub use crate::core::{Event, EventKind, MinPq, Particle, RunSummary, Simulation, Step};
pub use crate::error::{Error, Result};
pub use crate::render::{Canvas, Color, LogCanvas, NullCanvas};
