//! Simulation core: ideal-gas state, particle population, spatial hash,
//! collision response, valves and the per-tick scheduler.

pub mod bounds;
pub mod collision;
pub mod command;
pub mod cycle;
pub mod engine;
pub mod gas;
pub mod grid;
pub mod particle;
pub mod snapshot;
pub mod store;
pub mod valve;

pub use bounds::Bounds;
pub use command::{Command, ScheduledCommand};
pub use cycle::{CombustionCycle, Stroke};
pub use engine::Engine;
pub use gas::GasState;
pub use grid::{CellKey, SpatialGrid};
pub use particle::Particle;
pub use snapshot::{DrawParticle, GasReadout, Snapshot, TickStats};
pub use store::ParticleStore;
pub use valve::ValveController;
