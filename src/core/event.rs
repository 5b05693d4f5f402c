use crate::core::Particle;
use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// What happens when an event fires, and to whom.
///
/// Participants are indices into the simulation's particle vector. Tie-breaking for
/// deterministic ordering follows declaration order when times are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Particle-to-particle collision between `a` and `b`.
    Collision { a: u32, b: u32 },
    /// Particle `a` reaches the left or right wall.
    VerticalWall { a: u32 },
    /// Particle `b` reaches the top or bottom wall.
    HorizontalWall { b: u32 },
    /// Periodic render tick with no participants.
    Redraw,
}

impl EventKind {
    /// Participant slots (a, b) as they are stamped on the event.
    #[inline]
    pub fn participants(&self) -> (Option<u32>, Option<u32>) {
        match *self {
            EventKind::Collision { a, b } => (Some(a), Some(b)),
            EventKind::VerticalWall { a } => (Some(a), None),
            EventKind::HorizontalWall { b } => (None, Some(b)),
            EventKind::Redraw => (None, None),
        }
    }

    #[inline]
    fn order_key(&self) -> (u8, u32, u32) {
        match *self {
            EventKind::Collision { a, b } => (0, a, b),
            EventKind::VerticalWall { a } => (1, a, 0),
            EventKind::HorizontalWall { b } => (2, b, 0),
            EventKind::Redraw => (3, 0, 0),
        }
    }
}

/// A scheduled event with bounce-count snapshots of its participants.
///
/// - `time`: absolute occurrence time (finite, non-NaN).
/// - `kind`: event kind and participants.
/// - `count_a`, `count_b`: counters of the participants at creation; `None` for an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: NotNan<f64>,
    pub kind: EventKind,
    pub count_a: Option<u64>,
    pub count_b: Option<u64>,
}

impl Event {
    /// Create an event, stamping the current bounce counters of its participants.
    ///
    /// Errors: `Error::InvalidParam` if `time` is NaN or infinite, a participant index is
    /// out of range, or a collision names the same particle twice.
    pub fn new(time: f64, kind: EventKind, particles: &[Particle]) -> Result<Self> {
        if time.is_nan() {
            return Err(Error::InvalidParam("event time cannot be NaN".into()));
        }
        if !time.is_finite() {
            return Err(Error::InvalidParam("event time must be finite".into()));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        if let EventKind::Collision { a, b } = kind {
            if a == b {
                return Err(Error::InvalidParam(format!(
                    "particle {a} cannot collide with itself"
                )));
            }
        }
        let (a, b) = kind.participants();
        Ok(Self {
            time,
            kind,
            count_a: a.map(|i| stamp(particles, i)).transpose()?,
            count_b: b.map(|i| stamp(particles, i)).transpose()?,
        })
    }

    pub fn redraw(time: f64) -> Result<Self> {
        Self::new(time, EventKind::Redraw, &[])
    }

    pub fn collision(time: f64, a: u32, b: u32, particles: &[Particle]) -> Result<Self> {
        Self::new(time, EventKind::Collision { a, b }, particles)
    }

    pub fn vertical_wall(time: f64, a: u32, particles: &[Particle]) -> Result<Self> {
        Self::new(time, EventKind::VerticalWall { a }, particles)
    }

    pub fn horizontal_wall(time: f64, b: u32, particles: &[Particle]) -> Result<Self> {
        Self::new(time, EventKind::HorizontalWall { b }, particles)
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }

    /// An event stays valid while none of its participants has bounced since it was created.
    pub fn is_valid(&self, particles: &[Particle]) -> bool {
        let (a, b) = self.kind.participants();
        still_matches(particles, a, self.count_a) && still_matches(particles, b, self.count_b)
    }
}

fn stamp(particles: &[Particle], i: u32) -> Result<u64> {
    particles
        .get(i as usize)
        .map(|p| p.collision_count)
        .ok_or_else(|| {
            Error::InvalidParam(format!(
                "event participant {i} out of range for {} particles",
                particles.len()
            ))
        })
}

fn still_matches(particles: &[Particle], slot: Option<u32>, snapshot: Option<u64>) -> bool {
    match (slot, snapshot) {
        (Some(i), Some(cc)) => particles
            .get(i as usize)
            .is_some_and(|p| p.collision_count == cc),
        (None, None) => true,
        _ => false,
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => {
                let a = self.kind.order_key();
                let b = other.kind.order_key();
                match a.cmp(&b) {
                    // Final tie-breaker on snapshots to ensure a total order.
                    Ordering::Equal => {
                        (self.count_a, self.count_b).cmp(&(other.count_a, other.count_b))
                    }
                    o => o,
                }
            }
            o => o,
        }
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;

    fn pair() -> Result<Vec<Particle>> {
        Ok(vec![
            Particle::new([10.0, 10.0], [1.0, 0.0], 1.0, 1.0, Color::RED)?,
            Particle::new([20.0, 10.0], [-1.0, 0.0], 1.0, 1.0, Color::RED)?,
        ])
    }

    #[test]
    fn new_event_rejects_nan_and_infinite_time() -> Result<()> {
        let ps = pair()?;
        let err = Event::collision(f64::NAN, 0, 1, &ps).unwrap_err();
        assert!(err.to_string().contains("NaN"));
        assert!(Event::vertical_wall(f64::INFINITY, 0, &ps).is_err());
        Ok(())
    }

    #[test]
    fn new_event_rejects_missing_or_repeated_participants() -> Result<()> {
        let ps = pair()?;
        assert!(matches!(
            Event::horizontal_wall(1.0, 2, &ps),
            Err(Error::InvalidParam(_))
        ));
        assert!(matches!(
            Event::collision(1.0, 1, 1, &ps),
            Err(Error::InvalidParam(_))
        ));
        Ok(())
    }

    #[test]
    fn ordering_by_time() -> Result<()> {
        let ps = pair()?;
        let e1 = Event::collision(1.0, 0, 1, &ps)?;
        let e2 = Event::vertical_wall(2.0, 0, &ps)?;
        let e3 = Event::redraw(0.5)?;
        assert!(e1 < e2);
        assert!(e3 < e1);
        Ok(())
    }

    #[test]
    fn tie_breaker_prefers_collisions() -> Result<()> {
        let ps = pair()?;
        let a = Event::collision(5.0, 0, 1, &ps)?;
        let b = Event::vertical_wall(5.0, 0, &ps)?;
        let c = Event::redraw(5.0)?;
        assert!(a < b);
        assert!(b < c);
        Ok(())
    }

    #[test]
    fn snapshots_follow_slots() -> Result<()> {
        let mut ps = pair()?;
        ps[1].bump_collision_count();
        let redraw = Event::redraw(1.0)?;
        assert_eq!((redraw.count_a, redraw.count_b), (None, None));
        let h = Event::horizontal_wall(1.0, 1, &ps)?;
        assert_eq!((h.count_a, h.count_b), (None, Some(1)));
        let v = Event::vertical_wall(1.0, 0, &ps)?;
        assert_eq!((v.count_a, v.count_b), (Some(0), None));
        Ok(())
    }

    #[test]
    fn bounce_invalidates_earlier_events() -> Result<()> {
        let mut ps = pair()?;
        let before = Event::collision(4.0, 0, 1, &ps)?;
        let wall = Event::vertical_wall(9.0, 1, &ps)?;
        assert!(before.is_valid(&ps));
        assert!(wall.is_valid(&ps));

        ps[0].bounce_off_vertical_wall();
        assert!(!before.is_valid(&ps));
        // Particle 1 did not bounce.
        assert!(wall.is_valid(&ps));

        let after = Event::collision(4.0, 0, 1, &ps)?;
        assert!(after.is_valid(&ps));
        assert!(Event::redraw(3.0)?.is_valid(&ps));
        Ok(())
    }
}
