//! Construction parameters for a [`Simulation`](crate::core::Simulation).
//!
//! Loaded from JSON; missing fields fall back to their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_NUM_PARTICLES: usize = 20;
/// Arena edge length in simulation units.
pub const DEFAULT_ARENA_SIZE: f64 = 512.0;
pub const DEFAULT_TIME_LIMIT: f64 = 100.0;
/// Redraw ticks per simulated time unit.
pub const DEFAULT_REDRAW_HZ: f64 = 2.0;
/// Real-time delay after each presented frame.
pub const DEFAULT_PACE_MS: u64 = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of randomly placed particles.
    pub num_particles: usize,
    pub width: f64,
    pub height: f64,
    /// Simulated time after which no more events are scheduled; `None` runs until stopped.
    pub time_limit: Option<f64>,
    pub redraw_hz: f64,
    pub pace_ms: u64,
    /// RNG seed for reproducible initial states; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub title: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_particles: DEFAULT_NUM_PARTICLES,
            width: DEFAULT_ARENA_SIZE,
            height: DEFAULT_ARENA_SIZE,
            time_limit: Some(DEFAULT_TIME_LIMIT),
            redraw_hz: DEFAULT_REDRAW_HZ,
            pace_ms: DEFAULT_PACE_MS,
            seed: None,
            title: "collisim".to_string(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: SimConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every field, including the particle count.
    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 {
            return Err(Error::InvalidParam("num_particles must be > 0".into()));
        }
        self.validate_schedule()
    }

    /// Check the arena and scheduling fields only; used when particles are supplied explicitly.
    pub fn validate_schedule(&self) -> Result<()> {
        crate::core::particle::validate_arena(self.width, self.height)?;
        if let Some(limit) = self.time_limit {
            if limit.is_nan() || limit <= 0.0 {
                return Err(Error::InvalidParam("time_limit must be > 0".into()));
            }
        }
        if !self.redraw_hz.is_finite() || self.redraw_hz <= 0.0 {
            return Err(Error::InvalidParam(
                "redraw_hz must be finite and > 0".into(),
            ));
        }
        Ok(())
    }

    /// Simulated time between two redraw ticks.
    #[inline]
    pub fn redraw_interval(&self) -> f64 {
        1.0 / self.redraw_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let cfg = SimConfig::default();
        cfg.validate()?;
        assert_eq!(cfg.redraw_interval(), 0.5);
        Ok(())
    }

    #[test]
    fn partial_json_uses_defaults() -> Result<()> {
        let cfg = SimConfig::from_json_str(r#"{ "num_particles": 3, "seed": 42, "time_limit": null }"#)?;
        assert_eq!(cfg.num_particles, 3);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.time_limit, None);
        assert_eq!(cfg.width, DEFAULT_ARENA_SIZE);
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        for json in [
            r#"{ "num_particles": 0 }"#,
            r#"{ "width": -1.0 }"#,
            r#"{ "height": 0.0 }"#,
            r#"{ "time_limit": -5.0 }"#,
            r#"{ "redraw_hz": 0.0 }"#,
        ] {
            assert!(
                matches!(SimConfig::from_json_str(json), Err(Error::InvalidParam(_))),
                "{json} should be rejected"
            );
        }
        assert!(matches!(
            SimConfig::from_json_str("{ nope"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
