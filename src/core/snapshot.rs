use serde::Serialize;

use crate::core::bounds::Bounds;

/// Thermodynamic readout for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasReadout {
    pub volume: f64,
    pub temperature: f64,
    pub mass: f64,
    pub pressure: f64,
}

/// One particle as the renderer draws it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawParticle {
    pub x: f64,
    pub y: f64,
    pub alpha: u8,
}

/// Read-only drawable state produced after each tick.
///
/// `particles` lists active particles first, then the still-visible exiting
/// ones in the order they left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub gas: GasReadout,
    pub particles: Vec<DrawParticle>,
    pub bounds: Bounds,
    pub inlet_open: bool,
    pub outlet_open: bool,
}

/// Counters for one completed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub tick: u64,
    pub active: usize,
    pub exiting: usize,
    pub contacts: usize,
    pub pruned: usize,
}
