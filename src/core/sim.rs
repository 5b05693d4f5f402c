use crate::config::SimConfig;
use crate::core::particle::DIM;
use crate::core::{Event, EventKind, MinPq, Particle};
use crate::error::{Error, Result};
use crate::render::Canvas;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

/// Small numeric tolerance for time and geometric checks.
const EPS_TIME: f64 = 1e-12;

/// Largest interpenetration depth accepted as rounding noise between touching surfaces.
const EPS_CONTACT: f64 = 1e-9;

const MAX_PLACEMENT_ATTEMPTS: usize = 1_000_000;

/// Outcome of popping a single event off the queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// A participant bounced after the event was scheduled; nothing happened.
    Discarded(Event),
    /// The event was current: the clock moved to its time and its effect was applied.
    Applied(Event),
}

/// Counters accumulated since the simulation was built.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub events_popped: u64,
    pub stale_discarded: u64,
    pub collisions: u64,
    pub wall_bounces: u64,
    pub frames: u64,
    pub final_time: f64,
    /// The stop signal fired before the queue drained.
    pub stopped_early: bool,
}

/// Event-driven hard-disc simulation in a `[0, width] x [0, height]` box.
///
/// Every particle's position always reflects the state at [`Simulation::time`]. Future
/// events are never removed eagerly: when a particle bounces, the events that still
/// reference its old trajectory stay queued and are discarded when popped.
#[derive(Debug)]
pub struct Simulation {
    time_now: f64,
    width: f64,
    height: f64,
    time_limit: Option<f64>,
    redraw_interval: f64,
    pace_ms: u64,
    title: String,
    particles: Vec<Particle>,
    pq: MinPq<Event>,
    stats: RunSummary,
}

impl Simulation {
    /// Create a simulation with `config.num_particles` randomly placed, non-overlapping
    /// default particles.
    ///
    /// Particles are placed with simple rejection sampling; the RNG is seeded from
    /// `config.seed` when given.
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate()?;

        let mut rng: StdRng = match config.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let mut particles: Vec<Particle> = Vec::with_capacity(config.num_particles);
        for id in 0..config.num_particles {
            let mut attempts = 0usize;
            let p = loop {
                if attempts >= MAX_PLACEMENT_ATTEMPTS {
                    return Err(Error::InvalidParam(format!(
                        "failed to place particle {id} without overlap; try fewer particles or a larger arena"
                    )));
                }
                attempts += 1;
                let candidate = Particle::random(config.width, config.height, &mut rng)?;
                if !overlaps_existing(&particles, &candidate) {
                    break candidate;
                }
            };
            particles.push(p);
        }

        Self::from_particles(particles, config)
    }

    /// Create a simulation from explicit particle states.
    ///
    /// The arena and scheduling fields of `config` are used; its particle count and seed
    /// are ignored. Every disc must lie inside the arena and no two discs may overlap.
    pub fn from_particles(particles: Vec<Particle>, config: &SimConfig) -> Result<Self> {
        config.validate_schedule()?;
        if particles.is_empty() {
            return Err(Error::InvalidParam("at least one particle is required".into()));
        }
        if u32::try_from(particles.len()).is_err() {
            return Err(Error::InvalidParam("too many particles".into()));
        }
        let extent = [config.width, config.height];
        for (i, p) in particles.iter().enumerate() {
            for k in 0..DIM {
                if p.r[k] - p.radius < -EPS_TIME || p.r[k] + p.radius > extent[k] + EPS_TIME {
                    return Err(Error::InvalidParam(format!(
                        "particle {i} does not fit inside the {}x{} arena",
                        config.width, config.height
                    )));
                }
            }
            if let Some(j) = particles[..i].iter().position(|q| q.gap(p) < -EPS_TIME) {
                return Err(Error::InvalidParam(format!(
                    "particles {j} and {i} overlap"
                )));
            }
        }

        let mut sim = Self {
            time_now: 0.0,
            width: config.width,
            height: config.height,
            time_limit: config.time_limit,
            redraw_interval: config.redraw_interval(),
            pace_ms: config.pace_ms,
            title: config.title.clone(),
            pq: MinPq::with_capacity(4 * particles.len()),
            particles,
            stats: RunSummary::default(),
        };

        sim.schedule_initial_events()?;
        Ok(sim)
    }

    /// Returns current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for external edits; call [`Simulation::rebuild_event_queue`] afterwards
    /// so predictions match the new state.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Queued events, stale ones included.
    pub fn pending_events(&self) -> usize {
        self.pq.len()
    }

    /// Counters so far, with `final_time` set to the current clock.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            final_time: self.time_now,
            ..self.stats
        }
    }

    /// Run until the queue drains.
    ///
    /// With no time limit the redraw tick keeps rescheduling itself and this never returns;
    /// use [`Simulation::run`] with a stop signal instead.
    pub fn simulate(&mut self, canvas: &mut dyn Canvas) -> Result<RunSummary> {
        self.run(canvas, |_| false)
    }

    /// Run until the queue drains or `should_stop` returns true.
    ///
    /// The signal is checked once at the top of every iteration, before the next pop.
    pub fn run<F>(&mut self, canvas: &mut dyn Canvas, mut should_stop: F) -> Result<RunSummary>
    where
        F: FnMut(&Simulation) -> bool,
    {
        if !self.title.is_empty() {
            canvas.set_title(&self.title);
        }
        log::info!(
            "starting run: {} particles in a {}x{} arena, t={}, limit={:?}, {} queued events",
            self.particles.len(),
            self.width,
            self.height,
            self.time_now,
            self.time_limit,
            self.pq.len()
        );

        let mut stopped_early = false;
        loop {
            if should_stop(self) {
                stopped_early = true;
                break;
            }
            if self.step(canvas)?.is_none() {
                break;
            }
        }

        let summary = RunSummary {
            stopped_early,
            ..self.summary()
        };
        log::info!(
            "run finished at t={}: {} collisions, {} wall bounces, {} frames, {}/{} events stale{}",
            summary.final_time,
            summary.collisions,
            summary.wall_bounces,
            summary.frames,
            summary.stale_discarded,
            summary.events_popped,
            if stopped_early { " (stopped)" } else { "" }
        );
        Ok(summary)
    }

    /// Pop one event and process it.
    ///
    /// Returns `None` once the queue is empty. A stale event is discarded without
    /// touching the clock.
    pub fn step(&mut self, canvas: &mut dyn Canvas) -> Result<Option<Step>> {
        if self.pq.is_empty() {
            return Ok(None);
        }
        let ev = self.pq.remove_min()?;
        self.stats.events_popped += 1;

        if !ev.is_valid(&self.particles) {
            self.stats.stale_discarded += 1;
            return Ok(Some(Step::Discarded(ev)));
        }

        self.drift_all(ev.time_f64())?;
        log::trace!("t={}: {:?}", self.time_now, ev.kind);

        match ev.kind {
            EventKind::Collision { a, b } => {
                let (pa, pb) = pair_mut(&mut self.particles, a as usize, b as usize);
                pa.bounce_off(pb);
                self.stats.collisions += 1;
            }
            EventKind::VerticalWall { a } => {
                self.particles[a as usize].bounce_off_vertical_wall();
                self.stats.wall_bounces += 1;
            }
            EventKind::HorizontalWall { b } => {
                self.particles[b as usize].bounce_off_horizontal_wall();
                self.stats.wall_bounces += 1;
            }
            EventKind::Redraw => self.redraw(canvas)?,
        }

        let (a, b) = ev.kind.participants();
        for i in [a, b].into_iter().flatten() {
            self.predict_collisions(i as usize)?;
        }

        Ok(Some(Step::Applied(ev)))
    }

    /// Process every event due at or before `target_time`, then drift all particles to it.
    ///
    /// Nothing is scheduled past the time limit, so targets beyond it are rejected.
    pub fn advance_to(&mut self, target_time: f64, canvas: &mut dyn Canvas) -> Result<()> {
        if !target_time.is_finite() {
            return Err(Error::InvalidParam("target_time must be finite".into()));
        }
        if let Some(limit) = self.time_limit {
            if target_time > limit {
                return Err(Error::InvalidParam(format!(
                    "target_time {target_time} is past the time limit {limit}"
                )));
            }
        }
        if target_time < self.time_now - EPS_TIME {
            return Err(Error::InvalidParam(
                "target_time cannot be earlier than current time".into(),
            ));
        }

        loop {
            let next = match self.pq.peek_min() {
                Some(ev) => ev.time_f64(),
                None => break,
            };
            if next > target_time {
                break;
            }
            self.step(canvas)?;
        }

        self.drift_all(target_time.max(self.time_now))
    }

    /// Compute total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total linear momentum (diagnostic; walls do not conserve it).
    pub fn momentum(&self) -> [f64; DIM] {
        self.particles.iter().fold([0.0; DIM], |acc, p| {
            let m = p.momentum();
            [acc[0] + m[0], acc[1] + m[1]]
        })
    }

    /// Smallest surface-to-surface distance over all pairs; negative means interpenetration.
    pub fn min_gap(&self) -> f64 {
        let mut best = f64::INFINITY;
        for (i, p) in self.particles.iter().enumerate() {
            for q in &self.particles[i + 1..] {
                best = best.min(p.gap(q));
            }
        }
        best
    }

    /// Rebuild the event queue from the current particle states.
    ///
    /// Needed after editing particles through [`Simulation::particles_mut`].
    pub fn rebuild_event_queue(&mut self) -> Result<()> {
        self.pq.clear();
        self.schedule_initial_events()?;
        log::debug!(
            "event queue rebuilt at t={} with {} events",
            self.time_now,
            self.pq.len()
        );
        Ok(())
    }

    // ============ Internal helpers ============

    fn schedule_initial_events(&mut self) -> Result<()> {
        for i in 0..self.particles.len() {
            self.predict_collisions(i)?;
        }
        // First frame shows the initial state.
        self.schedule(0.0, EventKind::Redraw)
    }

    /// Queue every future collision and wall event for particle `i` from its current trajectory.
    ///
    /// Errors: `Error::MathError` if `i` already interpenetrates an approaching particle by
    /// more than rounding noise.
    fn predict_collisions(&mut self, i: usize) -> Result<()> {
        for j in 0..self.particles.len() {
            if j == i {
                continue;
            }
            let dt = self.particles[i].time_to_hit(&self.particles[j]);
            if dt < 0.0 {
                let depth = -self.particles[i].gap(&self.particles[j]);
                if depth > EPS_CONTACT {
                    return Err(Error::MathError(format!(
                        "particles {i} and {j} interpenetrate by {depth} at t={}",
                        self.time_now
                    )));
                }
            }
            self.schedule(
                dt,
                EventKind::Collision {
                    a: i as u32,
                    b: j as u32,
                },
            )?;
        }

        let dt_x = self.particles[i].time_to_hit_vertical_wall(self.width);
        self.schedule(dt_x, EventKind::VerticalWall { a: i as u32 })?;
        let dt_y = self.particles[i].time_to_hit_horizontal_wall(self.height);
        self.schedule(dt_y, EventKind::HorizontalWall { b: i as u32 })
    }

    /// Push an event `dt` from now unless it never happens or falls at or past the time limit.
    fn schedule(&mut self, dt: f64, kind: EventKind) -> Result<()> {
        // Surfaces already in contact can yield a slightly negative interval.
        let t = self.time_now + dt.max(0.0);
        if !t.is_finite() || self.time_limit.is_some_and(|limit| t >= limit) {
            return Ok(());
        }
        let ev = Event::new(t, kind, &self.particles)?;
        self.pq.insert(ev);
        Ok(())
    }

    fn redraw(&mut self, canvas: &mut dyn Canvas) -> Result<()> {
        canvas.clear();
        for p in &self.particles {
            p.draw(canvas);
        }
        canvas.show();
        canvas.pause(self.pace_ms);
        self.stats.frames += 1;
        log::debug!(
            "frame {} at t={}, {} queued events",
            self.stats.frames,
            self.time_now,
            self.pq.len()
        );
        self.schedule(self.redraw_interval, EventKind::Redraw)
    }

    /// Drift all particles to the specified absolute time by linear motion.
    fn drift_all(&mut self, to_time: f64) -> Result<()> {
        if to_time < self.time_now - EPS_TIME {
            return Err(Error::MathError(format!(
                "cannot drift backwards in time (from {} to {to_time})",
                self.time_now
            )));
        }
        let dt = to_time - self.time_now;
        if dt > 0.0 {
            for p in &mut self.particles {
                p.drift(dt);
            }
            self.time_now = to_time;
        }
        Ok(())
    }
}

// ============ Utility helpers ============

/// Two distinct mutable particles out of one slice.
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = particles.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = particles.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

fn overlaps_existing(existing: &[Particle], candidate: &Particle) -> bool {
    existing.iter().any(|p| p.gap(candidate) < 0.0)
}
