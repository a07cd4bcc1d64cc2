//! Particle gas engine.
//!
//! An ideal-gas state (volume, temperature, mass → pressure) drives a
//! population of point particles that collide elastically inside a resizable
//! box. Gas enters through an inlet valve as a jet of fast particles and
//! leaves through an outlet valve, where the nearest particles are escorted
//! out and faded away.
//!
//! ```no_run
//! use pressure_sim::{Command, Engine, SimConfig};
//!
//! let mut engine = Engine::new(SimConfig::default())?;
//! engine.apply(Command::AddGas(0.1));
//! engine.tick();
//! let frame = engine.snapshot();
//! println!("{} particles at {:.1} Pa", frame.particles.len(), frame.gas.pressure);
//! # Ok::<(), pressure_sim::error::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::SimConfig;
pub use crate::core::{Command, Engine, Snapshot};
