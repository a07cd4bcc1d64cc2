use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Stroke of a four-stroke cycle, by crank angle quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Intake,
    Compression,
    Ignition,
    Exhaust,
}

impl Stroke {
    /// Stroke for crank angle `theta` (radians, wrapped into `[0, 2π)`).
    ///
    /// Exact quadrant boundaries belong to no stroke.
    pub fn at(theta: f64) -> Option<Self> {
        let t = theta.rem_euclid(TAU);
        if 0.0 < t && t < FRAC_PI_2 {
            Some(Self::Intake)
        } else if FRAC_PI_2 < t && t < PI {
            Some(Self::Compression)
        } else if PI < t && t < 3.0 * FRAC_PI_2 {
            Some(Self::Ignition)
        } else if 3.0 * FRAC_PI_2 < t && t < TAU {
            Some(Self::Exhaust)
        } else {
            None
        }
    }

    /// Per-step pressure change during this stroke.
    pub fn pressure_step(self) -> f64 {
        match self {
            Self::Intake => 0.01,
            Self::Compression => 0.02,
            Self::Ignition => -0.02,
            Self::Exhaust => -0.01,
        }
    }
}

/// Normalized cylinder pressure driven by crank angle.
///
/// A standalone model for hosts that animate an engine cycle next to the gas
/// box; the host owns the crank angle and calls [`CombustionCycle::update`]
/// once per frame. [`Engine::combustion`](crate::core::Engine::combustion)
/// builds one from the configured maximum. Always within `[1.0, max_pressure]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CombustionCycle {
    pressure: f64,
    max_pressure: f64,
}

impl CombustionCycle {
    pub fn new(max_pressure: f64) -> Self {
        Self {
            pressure: 1.0,
            max_pressure: max_pressure.max(1.0),
        }
    }

    #[inline]
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    #[inline]
    pub fn max_pressure(&self) -> f64 {
        self.max_pressure
    }

    /// Advance one frame at crank angle `theta` and return the new pressure.
    pub fn update(&mut self, theta: f64) -> f64 {
        if let Some(stroke) = Stroke::at(theta) {
            self.pressure += stroke.pressure_step();
        }
        self.pressure = self.pressure.clamp(1.0, self.max_pressure);
        self.pressure
    }
}
