/// Fixed spatial dimension (3D).
pub const DIM: usize = 3;

/// Opacity of a fully visible particle.
pub const OPAQUE: u8 = 255;

/// Thermal speed of a particle at `temperature` entering with `pressure_ratio`.
///
/// `sqrt(T / 100) * ratio`; temperatures below zero count as zero.
#[inline]
pub fn nominal_speed(temperature: f64, pressure_ratio: f64) -> f64 {
    (temperature.max(0.0) / 100.0).sqrt() * pressure_ratio
}

/// Velocity of magnitude `speed` with heading `azimuth` in the xy plane and
/// `elevation` out of it.
#[inline]
pub fn velocity_from_angles(speed: f64, azimuth: f64, elevation: f64) -> [f64; DIM] {
    let planar = speed * elevation.cos();
    [
        planar * azimuth.cos(),
        planar * azimuth.sin(),
        speed * elevation.sin(),
    ]
}

/// A gas particle: a unit point mass drawn as a small disc.
///
/// Fields:
/// - `id`: insertion sequence number, unique for the engine's lifetime
/// - `r`: position [x, y, z] in container coordinates
/// - `v`: velocity per tick [vx, vy, vz]
/// - `temperature`: gas temperature the current speed was drawn for
/// - `pressure_ratio`: speed multiplier fixed at creation
/// - `alpha`: opacity, 0 means the particle is gone
/// - `exiting`: set once the outlet has claimed the particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub r: [f64; DIM],
    pub v: [f64; DIM],
    pub temperature: f64,
    pub pressure_ratio: f64,
    pub alpha: u8,
    pub exiting: bool,
}

impl Particle {
    pub fn new(id: u64, r: [f64; DIM], v: [f64; DIM], temperature: f64, pressure_ratio: f64) -> Self {
        Self {
            id,
            r,
            v,
            temperature,
            pressure_ratio,
            alpha: OPAQUE,
            exiting: false,
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        dot(&self.v, &self.v).sqrt()
    }

    /// Kinetic energy with unit mass: 1/2 |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * dot(&self.v, &self.v)
    }

    /// Rescale speed for a new gas temperature, keeping the direction.
    ///
    /// The speed is multiplied by `nominal(new) / nominal(old)`, so a particle
    /// moving at its nominal speed ends up at exactly
    /// `sqrt(new / 100) * pressure_ratio`. Returns `false` when the direction
    /// is undefined (zero velocity or zero source temperature) and the caller
    /// must draw a fresh heading.
    pub fn rescale_to(&mut self, new_temperature: f64) -> bool {
        let old = nominal_speed(self.temperature, self.pressure_ratio);
        self.temperature = new_temperature.max(0.0);
        if old <= 0.0 || self.speed() <= 0.0 {
            return false;
        }
        let factor = nominal_speed(self.temperature, self.pressure_ratio) / old;
        for c in &mut self.v {
            *c *= factor;
        }
        true
    }

    /// Lower the opacity by `step`, saturating at 0.
    #[inline]
    pub fn fade(&mut self, step: u8) {
        self.alpha = self.alpha.saturating_sub(step);
    }

    #[inline]
    pub fn is_faded(&self) -> bool {
        self.alpha == 0
    }
}

#[inline]
pub fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
