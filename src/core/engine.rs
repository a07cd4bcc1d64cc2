use std::f64::consts::PI;

use log::{debug, info, trace};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::SimConfig;
use crate::core::bounds::Bounds;
use crate::core::collision::{apply_contacts, detect_cell, integrate, Contact};
use crate::core::command::Command;
use crate::core::cycle::CombustionCycle;
use crate::core::gas::GasState;
use crate::core::grid::SpatialGrid;
use crate::core::particle::{nominal_speed, velocity_from_angles};
use crate::core::snapshot::{DrawParticle, GasReadout, Snapshot, TickStats};
use crate::core::store::ParticleStore;
use crate::core::valve::ValveController;
use crate::error::Result;

/// The whole simulation: gas state, particles, spatial index, valves and
/// the worker pool that runs the collision phase.
///
/// Commands mutate the engine between ticks (`&mut self`), so nothing can
/// touch the particles while a tick is in flight.
pub struct Engine {
    cfg: SimConfig,
    gas: GasState,
    store: ParticleStore,
    grid: SpatialGrid,
    valves: ValveController,
    bounds: Bounds,
    pool: ThreadPool,
    rng: StdRng,
    tick: u64,
}

impl Engine {
    /// Build an engine and fill the container with the population its
    /// initial mass represents.
    ///
    /// Errors:
    /// - `Error::InvalidParam` when the config fails validation.
    /// - `Error::ThreadPool` when the worker threads cannot be spawned.
    pub fn new(cfg: SimConfig) -> Result<Self> {
        cfg.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(cfg.workers)
            .thread_name(|i| format!("gas-worker-{i}"))
            .build()?;
        let rng: StdRng = match cfg.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let gas = GasState::from_config(&cfg);
        let bounds = Bounds::for_volume(&cfg, gas.volume());
        let mut engine = Self {
            cfg,
            gas,
            store: ParticleStore::new(),
            grid: SpatialGrid::new(),
            valves: ValveController::new(),
            bounds,
            pool,
            rng,
            tick: 0,
        };
        engine.repopulate();
        info!(
            "engine ready: {} particles, {} workers, P = {:.2} Pa",
            engine.store.len(),
            engine.cfg.workers,
            engine.gas.pressure()
        );
        Ok(engine)
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    #[inline]
    pub fn gas(&self) -> &GasState {
        &self.gas
    }

    #[inline]
    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    /// Direct access to the population, e.g. to stage a scenario.
    #[inline]
    pub fn particles_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn inlet_open(&self) -> bool {
        self.valves.inlet_open()
    }

    pub fn outlet_open(&self) -> bool {
        self.valves.outlet_open(&self.store)
    }

    /// A fresh cylinder-pressure model bounded by `combustion_max_pressure`.
    pub fn combustion(&self) -> CombustionCycle {
        CombustionCycle::new(self.cfg.combustion_max_pressure)
    }

    /// Total kinetic energy of the active particles (unit masses).
    pub fn kinetic_energy(&self) -> f64 {
        self.store.active().iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Dispatch one host command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::IncreaseVolume => self.change_volume(self.cfg.volume_step),
            Command::DecreaseVolume => self.change_volume(-self.cfg.volume_step),
            Command::IncreaseTemperature => self.change_temperature(self.cfg.temperature_step),
            Command::DecreaseTemperature => self.change_temperature(-self.cfg.temperature_step),
            Command::AddGas(mass) => {
                self.add_gas(mass);
            }
            Command::ReleaseGas(mass) => {
                self.release_gas(mass);
            }
        }
    }

    /// Resize the gas volume. The container follows on the next tick.
    pub fn change_volume(&mut self, delta: f64) {
        self.gas.change_volume(delta);
        debug!("volume -> {:.3}", self.gas.volume());
    }

    /// Change the gas temperature and rescale every active particle's speed.
    ///
    /// Directions are kept; particles without a defined direction get a fresh
    /// random heading at the new nominal speed. With
    /// `repopulate_on_temperature_change` the population is rebuilt instead.
    pub fn change_temperature(&mut self, delta: f64) {
        let old = self.gas.change_temperature(delta);
        let new = self.gas.temperature();
        debug!("temperature {old:.1} -> {new:.1}");

        if self.cfg.repopulate_on_temperature_change {
            self.repopulate();
            return;
        }
        let max_elevation = self.cfg.max_elevation;
        for p in self.store.active_mut() {
            if !p.rescale_to(new) {
                let azimuth = self.rng.random_range(-PI..PI);
                let elevation = if max_elevation > 0.0 {
                    self.rng.random_range(-max_elevation..=max_elevation)
                } else {
                    0.0
                };
                p.v = velocity_from_angles(nominal_speed(new, p.pressure_ratio), azimuth, elevation);
            }
        }
    }

    /// Inject `mass` kilograms through the inlet. Returns the particles added.
    pub fn add_gas(&mut self, mass: f64) -> usize {
        self.valves.inject(
            &self.cfg,
            &self.bounds,
            &mut self.store,
            &mut self.gas,
            mass,
            &mut self.rng,
        )
    }

    /// Release `mass` kilograms through the outlet. Returns the particles
    /// sent exiting.
    pub fn release_gas(&mut self, mass: f64) -> usize {
        self.valves
            .eject(&self.cfg, &self.bounds, &mut self.store, &mut self.gas, mass)
    }

    /// Rebuild the whole population from the current mass and temperature.
    pub fn repopulate(&mut self) -> usize {
        self.bounds = Bounds::for_volume(&self.cfg, self.gas.volume());
        let n = self.store.populate(
            &self.cfg,
            &self.bounds,
            self.gas.mass(),
            self.gas.temperature(),
            &mut self.rng,
        );
        debug!("repopulated with {n} particles");
        n
    }

    /// Advance the simulation one frame.
    ///
    /// 1. resize the container from the current volume
    /// 2. rebin active particles
    /// 3. detect contacts per cell on the worker pool (read-only), apply them
    ///    in cell order, then integrate and reflect in parallel
    /// 4. move and fade exiting particles
    /// 5. drop fully faded ones
    ///
    /// The detection phase writes nothing shared and the application order is
    /// fixed by cell index, so the outcome does not depend on the pool size.
    pub fn tick(&mut self) -> TickStats {
        self.bounds = Bounds::for_volume(&self.cfg, self.gas.volume());
        self.grid.rebuild(
            &self.bounds,
            self.cfg.cells_per_side,
            self.cfg.contact_diameter,
            self.store.active(),
        );

        let diameter = self.cfg.contact_diameter;
        let grid = &self.grid;
        let active = self.store.active();
        let per_cell: Vec<Vec<Contact>> = self.pool.install(|| {
            (0..grid.cell_count())
                .into_par_iter()
                .map(|c| detect_cell(grid, active, c, diameter))
                .collect()
        });

        let bounds = self.bounds;
        let active = self.store.active_mut();
        let mut contacts = 0;
        for cell in &per_cell {
            apply_contacts(active, cell);
            contacts += cell.len();
        }
        self.pool
            .install(|| active.par_iter_mut().for_each(|p| integrate(p, &bounds)));

        self.valves
            .advance_exiting(&self.cfg, &self.bounds, &mut self.store);
        let pruned = self.store.prune_faded();
        self.valves.step();
        self.tick += 1;

        let stats = TickStats {
            tick: self.tick,
            active: self.store.active().len(),
            exiting: self.store.exiting().len(),
            contacts,
            pruned,
        };
        trace!("{stats:?}");
        stats
    }

    /// Drawable state for the renderer.
    pub fn snapshot(&self) -> Snapshot {
        let particles = self
            .store
            .iter_live()
            .filter(|p| !p.is_faded())
            .map(|p| DrawParticle {
                x: p.r[0],
                y: p.r[1],
                alpha: p.alpha,
            })
            .collect();
        Snapshot {
            tick: self.tick,
            gas: GasReadout {
                volume: self.gas.volume(),
                temperature: self.gas.temperature(),
                mass: self.gas.mass(),
                pressure: self.gas.pressure(),
            },
            particles,
            bounds: self.bounds,
            inlet_open: self.inlet_open(),
            outlet_open: self.outlet_open(),
        }
    }
}
