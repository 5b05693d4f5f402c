//! Event-driven engine: particle kinematics, the event queue and the simulation loop.

pub mod event;
pub mod particle;
pub mod pq;
pub mod sim;

pub use event::{Event, EventKind};
pub use particle::Particle;
pub use pq::MinPq;
pub use sim::{RunSummary, Simulation, Step};
