use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by the queue, the particle model and the simulation loop.
///
/// Degenerate trajectories (parallel motion, no relative velocity, a miss) are not
/// errors; they surface as an infinite time to impact.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid caller-supplied argument (dimensions, radius, mass, participant index, ...).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// `remove_min` was called on an empty priority queue.
    #[error("priority queue is empty")]
    EmptyQueue,

    /// Numerical state that cannot be given a physical meaning (zero contact distance,
    /// an event scheduled before the current clock).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Propagated I/O errors while reading a configuration file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
