use crate::error::{Error, Result};
use crate::render::{Canvas, Color};
use rand::Rng;

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// Upper bound on each initial velocity component of a randomly created particle.
pub const DEFAULT_MAX_VELOCITY: f64 = 3.0;
pub const DEFAULT_RADIUS: f64 = 10.0;
pub const DEFAULT_MASS: f64 = 250.0;

/// A hard disc moving in a `[0, width] x [0, height]` box.
///
/// Fields:
/// - `r`: centre position [x, y]
/// - `v`: velocity [vx, vy]
/// - `radius`: disc radius (>= 0)
/// - `mass`: particle mass (> 0)
/// - `color`: display attribute, not used by the physics
/// - `collision_count`: incremented on every bounce, wall or particle
#[derive(Debug, Clone)]
pub struct Particle {
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    /// Disc radius (>= 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
    pub color: Color,
    /// Bounce counter (for event invalidation).
    pub collision_count: u64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is negative, `mass` is non-positive, or any
    ///   component is NaN/inf.
    pub fn new(r: [f64; DIM], v: [f64; DIM], radius: f64, mass: f64, color: Color) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidParam("radius must be finite and >= 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            r,
            v,
            radius,
            mass,
            color,
            collision_count: 0,
        })
    }

    /// Create a default-sized particle at a uniformly random position fully inside the arena,
    /// with velocity components uniform in `[-DEFAULT_MAX_VELOCITY, DEFAULT_MAX_VELOCITY]`.
    pub fn random<R: Rng>(width: f64, height: f64, rng: &mut R) -> Result<Self> {
        validate_arena(width, height)?;
        let radius = DEFAULT_RADIUS;
        if width < 2.0 * radius || height < 2.0 * radius {
            return Err(Error::InvalidParam(format!(
                "arena {width}x{height} is too small for a disc of radius {radius}"
            )));
        }
        let r = [
            rng.random_range(radius..=width - radius),
            rng.random_range(radius..=height - radius),
        ];
        let v = [
            rng.random_range(-DEFAULT_MAX_VELOCITY..=DEFAULT_MAX_VELOCITY),
            rng.random_range(-DEFAULT_MAX_VELOCITY..=DEFAULT_MAX_VELOCITY),
        ];
        Self::new(r, v, radius, DEFAULT_MASS, Color::RED)
    }

    /// Time until this disc's surface touches `other`'s along the current straight-line
    /// trajectories, or `f64::INFINITY` if they never do.
    pub fn time_to_hit(&self, other: &Particle) -> f64 {
        if std::ptr::eq(self, other) {
            return f64::INFINITY;
        }
        let dx = other.r[0] - self.r[0];
        let dy = other.r[1] - self.r[1];
        let dvx = other.v[0] - self.v[0];
        let dvy = other.v[1] - self.v[1];
        let dvdr = dx * dvx + dy * dvy;
        if dvdr > 0.0 {
            return f64::INFINITY;
        }
        let dvdv = dvx * dvx + dvy * dvy;
        if dvdv == 0.0 {
            return f64::INFINITY;
        }
        let drdr = dx * dx + dy * dy;
        if drdr == 0.0 {
            // Coincident centres: the pair is at its contact instant and can only separate.
            return f64::INFINITY;
        }
        let sigma = self.radius + other.radius;
        let d = dvdr * dvdr - dvdv * (drdr - sigma * sigma);
        if d < 0.0 {
            return f64::INFINITY;
        }
        -(dvdr + d.sqrt()) / dvdv
    }

    /// Time until the disc edge reaches the left or right wall of an arena `width` wide.
    pub fn time_to_hit_vertical_wall(&self, width: f64) -> f64 {
        time_to_wall(self.r[0], self.v[0], self.radius, width)
    }

    /// Time until the disc edge reaches the bottom or top wall of an arena `height` tall.
    pub fn time_to_hit_horizontal_wall(&self, height: f64) -> f64 {
        time_to_wall(self.r[1], self.v[1], self.radius, height)
    }

    /// Advance the position along the current velocity for `dt` time units.
    #[inline]
    pub fn drift(&mut self, dt: f64) {
        for (rk, vk) in self.r.iter_mut().zip(self.v.iter()) {
            *rk += vk * dt;
        }
    }

    pub fn bounce_off_vertical_wall(&mut self) {
        self.v[0] = -self.v[0];
        self.bump_collision_count();
    }

    pub fn bounce_off_horizontal_wall(&mut self) {
        self.v[1] = -self.v[1];
        self.bump_collision_count();
    }

    /// Elastic collision response with `other`, assuming the two surfaces are in contact.
    ///
    /// The impulse acts along the line of centres; both velocities and both bounce
    /// counters are updated. Two zero-radius particles meet with coincident centres, so
    /// their contact normal is taken from the line of approach instead.
    pub fn bounce_off(&mut self, other: &mut Particle) {
        let dx = other.r[0] - self.r[0];
        let dy = other.r[1] - self.r[1];
        let dvx = other.v[0] - self.v[0];
        let dvy = other.v[1] - self.v[1];
        let dist = self.radius + other.radius;

        // Unit contact normal from self towards other, and the relative speed along it.
        let (nx, ny) = if dist > 0.0 {
            (dx / dist, dy / dist)
        } else {
            let speed = (dvx * dvx + dvy * dvy).sqrt();
            if speed == 0.0 {
                (0.0, 0.0)
            } else {
                (-dvx / speed, -dvy / speed)
            }
        };
        let dvdn = nx * dvx + ny * dvy;

        let (m1, m2) = (self.mass, other.mass);
        let magnitude = 2.0 * m1 * m2 * dvdn / (m1 + m2);
        let fx = magnitude * nx;
        let fy = magnitude * ny;

        self.v[0] += fx / m1;
        self.v[1] += fy / m1;
        other.v[0] -= fx / m2;
        other.v[1] -= fy / m2;

        self.bump_collision_count();
        other.bump_collision_count();
    }

    /// Increment the bounce counter (used for event invalidation).
    #[inline]
    pub fn bump_collision_count(&mut self) {
        self.collision_count = self.collision_count.saturating_add(1);
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Linear momentum m v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        [self.mass * self.v[0], self.mass * self.v[1]]
    }

    /// Signed distance between the two surfaces; negative when the discs interpenetrate.
    pub fn gap(&self, other: &Particle) -> f64 {
        let dx = other.r[0] - self.r[0];
        let dy = other.r[1] - self.r[1];
        (dx * dx + dy * dy).sqrt() - (self.radius + other.radius)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.set_pen_color(self.color);
        canvas.fill_circle(self.r[0], self.r[1], self.radius);
    }
}

/// Shared by both wall kinds: contact at `radius` on the low side, `extent - radius` on the high side.
#[inline]
fn time_to_wall(x: f64, v: f64, radius: f64, extent: f64) -> f64 {
    if v > 0.0 {
        (extent - radius - x) / v
    } else if v < 0.0 {
        (radius - x) / v
    } else {
        f64::INFINITY
    }
}

pub(crate) fn validate_arena(width: f64, height: f64) -> Result<()> {
    if !width.is_finite() || width <= 0.0 || !height.is_finite() || height <= 0.0 {
        return Err(Error::InvalidParam(
            "arena width and height must be finite and > 0".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn disc(r: [f64; DIM], v: [f64; DIM], radius: f64) -> Result<Particle> {
        Particle::new(r, v, radius, 1.0, Color::RED)
    }

    #[test]
    fn new_particle_ok() -> Result<()> {
        let p = Particle::new([0.0, 1.0], [2.0, -3.0], 0.5, 2.0, Color::BLUE)?;
        assert_eq!(p.r, [0.0, 1.0]);
        assert_eq!(p.v, [2.0, -3.0]);
        assert_eq!(p.radius, 0.5);
        assert_eq!(p.mass, 2.0);
        assert_eq!(p.color, Color::BLUE);
        assert_eq!(p.collision_count, 0);
        Ok(())
    }

    #[test]
    fn zero_radius_is_allowed() -> Result<()> {
        let p = disc([0.0, 0.0], [0.0, 0.0], 0.0)?;
        assert_eq!(p.radius, 0.0);
        Ok(())
    }

    #[test]
    fn invalid_radius_rejected() {
        let err = disc([0.0, 0.0], [0.0, 0.0], -1.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn invalid_mass_rejected() {
        let err = Particle::new([0.0, 0.0], [0.0, 0.0], 1.0, 0.0, Color::RED).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }

    #[test]
    fn head_on_collision_time() -> Result<()> {
        let a = disc([0.0, 0.0], [1.0, 0.0], 1.0)?;
        let b = disc([10.0, 0.0], [-1.0, 0.0], 1.0)?;
        // gap of 8 closing at relative speed 2
        assert!((a.time_to_hit(&b) - 4.0).abs() < 1e-12);
        assert!((b.time_to_hit(&a) - 4.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn diverging_parallel_and_missing_are_infinite() -> Result<()> {
        let a = disc([0.0, 0.0], [-1.0, 0.0], 1.0)?;
        let b = disc([10.0, 0.0], [1.0, 0.0], 1.0)?;
        assert_eq!(a.time_to_hit(&b), f64::INFINITY);

        let c = disc([0.0, 0.0], [1.0, 1.0], 1.0)?;
        let d = disc([10.0, 0.0], [1.0, 1.0], 1.0)?;
        assert_eq!(c.time_to_hit(&d), f64::INFINITY);

        // Approaching along x but offset by 5 in y with radii summing to 2: a miss.
        let e = disc([0.0, 0.0], [1.0, 0.0], 1.0)?;
        let f = disc([10.0, 5.0], [-1.0, 0.0], 1.0)?;
        assert_eq!(e.time_to_hit(&f), f64::INFINITY);
        Ok(())
    }

    #[test]
    fn self_is_never_hit() -> Result<()> {
        let a = disc([5.0, 5.0], [1.0, 0.0], 1.0)?;
        assert_eq!(a.time_to_hit(&a), f64::INFINITY);
        Ok(())
    }

    #[test]
    fn wall_times() -> Result<()> {
        let p = disc([10.0, 50.0], [2.0, 0.0], 1.0)?;
        assert!((p.time_to_hit_vertical_wall(100.0) - 44.5).abs() < 1e-12);
        assert_eq!(p.time_to_hit_horizontal_wall(100.0), f64::INFINITY);

        let q = disc([10.0, 50.0], [-3.0, -7.0], 1.0)?;
        assert!((q.time_to_hit_vertical_wall(100.0) - 3.0).abs() < 1e-12);
        assert!((q.time_to_hit_horizontal_wall(100.0) - 7.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn drift_and_wall_bounces() -> Result<()> {
        let mut p = disc([1.0, 2.0], [3.0, -4.0], 0.5)?;
        p.drift(0.5);
        assert_eq!(p.r, [2.5, 0.0]);
        p.drift(0.0);
        assert_eq!(p.r, [2.5, 0.0]);

        p.bounce_off_vertical_wall();
        assert_eq!(p.v, [-3.0, -4.0]);
        assert_eq!(p.collision_count, 1);
        p.bounce_off_horizontal_wall();
        assert_eq!(p.v, [-3.0, 4.0]);
        assert_eq!(p.collision_count, 2);
        Ok(())
    }

    #[test]
    fn equal_mass_head_on_swaps_velocities() -> Result<()> {
        let mut a = disc([0.0, 0.0], [1.0, 0.0], 1.0)?;
        let mut b = disc([2.0, 0.0], [-1.0, 0.0], 1.0)?;
        a.bounce_off(&mut b);
        assert!((a.v[0] + 1.0).abs() < 1e-12);
        assert!((b.v[0] - 1.0).abs() < 1e-12);
        assert_eq!(a.collision_count, 1);
        assert_eq!(b.collision_count, 1);
        Ok(())
    }

    #[test]
    fn point_particles_bounce_along_line_of_approach() -> Result<()> {
        let mut a = Particle::new([50.0, 50.0], [1.0, 0.0], 0.0, 1.0, Color::RED)?;
        let mut b = Particle::new([50.0, 50.0], [-1.0, 0.0], 0.0, 3.0, Color::RED)?;
        let e0 = a.kinetic_energy() + b.kinetic_energy();
        let p0 = a.momentum()[0] + b.momentum()[0];
        a.bounce_off(&mut b);
        // 1D elastic result for masses 1 and 3: v1' = -2, v2' = 0.
        assert!((a.v[0] + 2.0).abs() < 1e-12);
        assert!(b.v[0].abs() < 1e-12);
        assert_eq!(a.v[1], 0.0);
        assert!((a.kinetic_energy() + b.kinetic_energy() - e0).abs() < 1e-12);
        assert!((a.momentum()[0] + b.momentum()[0] - p0).abs() < 1e-12);
        assert_eq!((a.collision_count, b.collision_count), (1, 1));
        // Once they share a centre they are separating.
        assert_eq!(a.time_to_hit(&b), f64::INFINITY);
        Ok(())
    }

    #[test]
    fn random_particle_fits_inside_arena() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let p = Particle::random(100.0, 60.0, &mut rng)?;
            assert!(p.r[0] >= p.radius && p.r[0] <= 100.0 - p.radius);
            assert!(p.r[1] >= p.radius && p.r[1] <= 60.0 - p.radius);
            assert!(p.v.iter().all(|c| c.abs() <= DEFAULT_MAX_VELOCITY));
        }
        assert!(Particle::random(-1.0, 60.0, &mut rng).is_err());
        assert!(Particle::random(5.0, 60.0, &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn gap_is_signed() -> Result<()> {
        let a = disc([0.0, 0.0], [0.0, 0.0], 1.0)?;
        let b = disc([3.0, 0.0], [0.0, 0.0], 1.0)?;
        assert!((a.gap(&b) - 1.0).abs() < 1e-12);
        let c = disc([1.0, 0.0], [0.0, 0.0], 1.0)?;
        assert!((a.gap(&c) + 1.0).abs() < 1e-12);
        Ok(())
    }
}
