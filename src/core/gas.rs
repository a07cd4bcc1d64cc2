use crate::config::SimConfig;

/// Volume floor used when none is configured.
const DEFAULT_MIN_VOLUME: f64 = 1e-6;

/// Ideal-gas thermodynamic state of the container.
///
/// `pressure` is derived from `(volume, temperature, mass)` via
/// `P = (m / M) * R * T / V` and recomputed inside every mutator, so the
/// getter never observes a stale value.
#[derive(Debug, Clone, PartialEq)]
pub struct GasState {
    volume: f64,
    temperature: f64,
    mass: f64,
    gas_constant: f64,
    molar_mass: f64,
    min_volume: f64,
    pressure: f64,
}

impl GasState {
    pub fn new(volume: f64, temperature: f64, mass: f64, gas_constant: f64, molar_mass: f64) -> Self {
        let mut gas = Self {
            volume,
            temperature: temperature.max(0.0),
            mass: mass.max(0.0),
            gas_constant,
            molar_mass,
            min_volume: DEFAULT_MIN_VOLUME,
            pressure: 0.0,
        };
        gas.recompute();
        gas
    }

    pub fn from_config(cfg: &SimConfig) -> Self {
        let gas = Self::new(
            cfg.volume,
            cfg.temperature,
            cfg.mass,
            cfg.gas_constant,
            cfg.molar_mass,
        );
        gas.with_min_volume(cfg.min_volume)
    }

    /// Set the floor `change_volume` clamps to.
    pub fn with_min_volume(mut self, min_volume: f64) -> Self {
        self.min_volume = min_volume;
        self
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[inline]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    #[inline]
    pub fn gas_constant(&self) -> f64 {
        self.gas_constant
    }

    #[inline]
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Moles of gas in the container.
    pub fn moles(&self) -> f64 {
        self.mass / self.molar_mass
    }

    /// Adjust volume by `delta`; the result never drops below the configured floor.
    pub fn change_volume(&mut self, delta: f64) {
        self.volume = (self.volume + delta).max(self.min_volume);
        self.recompute();
    }

    /// Adjust temperature by `delta`, clamped at absolute zero.
    ///
    /// Returns the previous temperature so callers can rescale particle speeds.
    pub fn change_temperature(&mut self, delta: f64) -> f64 {
        let old = self.temperature;
        self.temperature = (self.temperature + delta).max(0.0);
        self.recompute();
        old
    }

    /// Add `mass` kilograms. Negative or non-finite amounts are ignored.
    pub fn add_gas(&mut self, mass: f64) {
        if !mass.is_finite() || mass < 0.0 {
            return;
        }
        self.mass = (self.mass + mass).max(0.0);
        self.recompute();
    }

    /// Remove up to `mass` kilograms; the stored mass is floored at zero.
    /// Negative or non-finite amounts are ignored.
    pub fn release_gas(&mut self, mass: f64) {
        if !mass.is_finite() || mass < 0.0 {
            return;
        }
        self.mass = (self.mass - mass).max(0.0);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.pressure = self.moles() * self.gas_constant * self.temperature / self.volume;
    }
}
