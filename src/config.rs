//! Tunable constants for an [`Engine`](crate::core::Engine).
//!
//! Every field has a default matching the reference gas demo (10 m³ of gas at
//! 300 K in a 200-unit box, 16 workers). Partial JSON documents are accepted;
//! missing fields fall back to [`SimConfig::default`].

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Initial gas volume (m³).
    pub volume: f64,
    /// Initial gas temperature (K).
    pub temperature: f64,
    /// Initial gas mass (kg).
    pub mass: f64,
    /// Universal gas constant R.
    pub gas_constant: f64,
    /// Molar mass used by the pressure law (kg/mol, air).
    pub molar_mass: f64,
    /// Molar mass used to turn mass into a particle count (kg/mol, O2).
    pub particle_molar_mass: f64,
    pub avogadro: f64,
    /// Sub-sampling factor applied to `moles * avogadro` to keep counts drawable.
    pub particle_scale: f64,
    /// Lower bound for volume after `change_volume`.
    pub min_volume: f64,

    /// Top-left corner of the container in host coordinates.
    pub origin: [f64; 2],
    /// Side length of the container at `reference_volume`.
    pub base_side: f64,
    pub reference_volume: f64,

    /// Grid cells along one side of the container.
    pub cells_per_side: usize,
    /// Two particles closer than this overlap.
    pub contact_diameter: f64,
    /// Size of the fixed worker pool.
    pub workers: usize,

    pub inlet_pressure_ratio: f64,
    /// Half-width of the inlet jet cone in the xy plane (radians).
    pub jet_half_angle: f64,
    /// Per-particle random tilt added to the jet heading (radians).
    pub jet_jitter: f64,
    /// Maximum elevation of a fresh velocity out of the xy plane (radians).
    pub max_elevation: f64,
    pub inlet_open_ticks: u32,

    pub exit_speed: f64,
    pub exit_speed_multiplier: f64,
    /// Distance past the outlet at which exiting particles start to fade.
    pub fade_margin: f64,
    pub fade_step: u8,

    pub volume_step: f64,
    pub temperature_step: f64,
    /// Rebuild the whole population after a temperature command instead of
    /// only rescaling velocities.
    pub repopulate_on_temperature_change: bool,

    /// Upper clamp of the normalized combustion-cycle pressure.
    pub combustion_max_pressure: f64,

    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            volume: 10.0,
            temperature: 300.0,
            mass: 10.0,
            gas_constant: 8.314,
            molar_mass: 0.02897,
            particle_molar_mass: 0.032,
            avogadro: 6.022e23,
            particle_scale: 1e-23,
            min_volume: 1.0,
            origin: [300.0, 200.0],
            base_side: 200.0,
            reference_volume: 10.0,
            cells_per_side: 20,
            contact_diameter: 2.0,
            workers: 16,
            inlet_pressure_ratio: 2.0,
            jet_half_angle: PI / 6.0,
            jet_jitter: 0.2,
            max_elevation: PI / 8.0,
            inlet_open_ticks: 30,
            exit_speed: 2.0,
            exit_speed_multiplier: 2.0,
            fade_margin: 10.0,
            fade_step: 5,
            volume_step: 1.0,
            temperature_step: 10.0,
            repopulate_on_temperature_change: false,
            combustion_max_pressure: 5.0,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values that would make the simulation degenerate.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("volume", self.volume),
            ("gas_constant", self.gas_constant),
            ("molar_mass", self.molar_mass),
            ("particle_molar_mass", self.particle_molar_mass),
            ("avogadro", self.avogadro),
            ("particle_scale", self.particle_scale),
            ("min_volume", self.min_volume),
            ("base_side", self.base_side),
            ("reference_volume", self.reference_volume),
            ("contact_diameter", self.contact_diameter),
            ("exit_speed", self.exit_speed),
            ("exit_speed_multiplier", self.exit_speed_multiplier),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParam(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        let non_negative = [
            ("temperature", self.temperature),
            ("mass", self.mass),
            ("fade_margin", self.fade_margin),
            ("jet_half_angle", self.jet_half_angle),
            ("jet_jitter", self.jet_jitter),
            ("max_elevation", self.max_elevation),
            ("inlet_pressure_ratio", self.inlet_pressure_ratio),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidParam(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if self.volume < self.min_volume {
            return Err(Error::InvalidParam(
                "volume must not be below min_volume".into(),
            ));
        }
        if self.cells_per_side == 0 {
            return Err(Error::InvalidParam("cells_per_side must be > 0".into()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidParam("workers must be > 0".into()));
        }
        if self.fade_step == 0 {
            return Err(Error::InvalidParam("fade_step must be > 0".into()));
        }
        if !self.combustion_max_pressure.is_finite() || self.combustion_max_pressure < 1.0 {
            return Err(Error::InvalidParam(
                "combustion_max_pressure must be finite and >= 1".into(),
            ));
        }
        if !self.origin.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidParam("origin must be finite".into()));
        }
        Ok(())
    }

    /// Particle count represented by `mass` kilograms of working gas.
    ///
    /// Shared by bulk population and both valves so that the population always
    /// tracks the same per-unit-mass density.
    pub fn particle_count(&self, mass: f64) -> usize {
        if mass.is_nan() || mass <= 0.0 {
            return 0;
        }
        let moles = mass / self.particle_molar_mass;
        (moles * self.avogadro * self.particle_scale).floor() as usize
    }
}
