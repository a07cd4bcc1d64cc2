use log::debug;
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::config::SimConfig;
use crate::core::bounds::Bounds;
use crate::core::gas::GasState;
use crate::core::particle::{nominal_speed, velocity_from_angles, OPAQUE};
use crate::core::store::ParticleStore;

/// Inlet/outlet ports on the side walls of the container.
///
/// The inlet turns added mass into a jet of fast particles entering at the
/// left wall. The outlet claims the particles nearest the right wall, sends
/// them out through the port, and fades them away once they are clear of it.
#[derive(Debug, Default, Clone)]
pub struct ValveController {
    inlet_ticks_left: u32,
}

impl ValveController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject `mass` of gas through the inlet. Returns the number of particles created.
    pub fn inject<R: Rng>(
        &mut self,
        cfg: &SimConfig,
        bounds: &Bounds,
        store: &mut ParticleStore,
        gas: &mut GasState,
        mass: f64,
        rng: &mut R,
    ) -> usize {
        if !is_transfer(mass) {
            debug!("inlet: ignoring mass {mass}");
            return 0;
        }
        let count = cfg.particle_count(mass);
        let [x, y] = bounds.inlet();
        let half_depth = bounds.half_depth();
        let temperature = gas.temperature();
        let speed = nominal_speed(temperature, cfg.inlet_pressure_ratio);

        for _ in 0..count {
            let z = symmetric(rng, half_depth);
            let azimuth = symmetric(rng, cfg.jet_half_angle) + symmetric(rng, cfg.jet_jitter);
            let elevation = symmetric(rng, cfg.max_elevation);
            let v = velocity_from_angles(speed, azimuth, elevation);
            store.push([x, y, z], v, temperature, cfg.inlet_pressure_ratio);
        }

        gas.add_gas(mass);
        if count > 0 {
            self.inlet_ticks_left = cfg.inlet_open_ticks.max(1);
        }
        debug!("inlet: +{mass} kg as {count} particles");
        count
    }

    /// Release `mass` of gas through the outlet. Returns the number of
    /// particles that started exiting.
    ///
    /// Candidates are ranked by xy distance to the outlet with a stable sort,
    /// so equal distances keep insertion order. Each claimed particle is aimed
    /// at a point `fade_margin` past the port.
    pub fn eject(
        &mut self,
        cfg: &SimConfig,
        bounds: &Bounds,
        store: &mut ParticleStore,
        gas: &mut GasState,
        mass: f64,
    ) -> usize {
        if !is_transfer(mass) {
            debug!("outlet: ignoring mass {mass}");
            return 0;
        }
        let count = cfg.particle_count(mass).min(store.active().len());
        let [ox, oy] = bounds.outlet();

        let mut ranked: Vec<(OrderedFloat<f64>, usize)> = store
            .active()
            .iter()
            .enumerate()
            .map(|(i, p)| (OrderedFloat((p.r[0] - ox).hypot(p.r[1] - oy)), i))
            .collect();
        ranked.sort_by_key(|&(d, _)| d);

        let mut chosen: Vec<usize> = ranked.iter().take(count).map(|&(_, i)| i).collect();
        chosen.sort_unstable();
        store.take_exiting(&chosen);

        let target = [ox + cfg.fade_margin, oy];
        let already = store.exiting().len() - count;
        for p in &mut store.exiting_mut()[already..] {
            let heading = (target[1] - p.r[1]).atan2(target[0] - p.r[0]);
            p.v = [cfg.exit_speed * heading.cos(), cfg.exit_speed * heading.sin(), 0.0];
        }

        gas.release_gas(mass);
        debug!("outlet: -{mass} kg, {count} particles exiting");
        count
    }

    /// Move exiting particles outward and fade those past the port.
    ///
    /// A particle that has started fading keeps fading even if the container
    /// grows past it.
    pub fn advance_exiting(&self, cfg: &SimConfig, bounds: &Bounds, store: &mut ParticleStore) {
        let fade_line = bounds.right() + cfg.fade_margin;
        for p in store.exiting_mut() {
            p.r[0] += p.v[0] * cfg.exit_speed_multiplier;
            p.r[1] += p.v[1] * cfg.exit_speed_multiplier;
            if p.alpha < OPAQUE || p.r[0] >= fade_line {
                p.fade(cfg.fade_step);
            }
        }
    }

    /// Count down the inlet indicator; called once per tick.
    pub fn step(&mut self) {
        self.inlet_ticks_left = self.inlet_ticks_left.saturating_sub(1);
    }

    #[inline]
    pub fn inlet_open(&self) -> bool {
        self.inlet_ticks_left > 0
    }

    /// The outlet stays open while anything is still on its way out.
    #[inline]
    pub fn outlet_open(&self, store: &ParticleStore) -> bool {
        !store.exiting().is_empty()
    }
}

/// Only finite, non-negative masses move gas through a port.
#[inline]
fn is_transfer(mass: f64) -> bool {
    mass.is_finite() && mass >= 0.0
}

fn symmetric<R: Rng>(rng: &mut R, half: f64) -> f64 {
    if half > 0.0 {
        rng.random_range(-half..=half)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::DIM;
    use rand::{rngs::StdRng, SeedableRng};

    fn setup() -> (SimConfig, Bounds, ParticleStore, GasState) {
        let cfg = SimConfig::default();
        let bounds = Bounds::for_volume(&cfg, cfg.volume);
        let gas = GasState::from_config(&cfg);
        (cfg, bounds, ParticleStore::new(), gas)
    }

    #[test]
    fn inject_spawns_jet_at_inlet() {
        let (cfg, bounds, mut store, mut gas) = setup();
        let mut valves = ValveController::new();
        let mut rng = StdRng::seed_from_u64(5);
        let n = valves.inject(&cfg, &bounds, &mut store, &mut gas, 0.1, &mut rng);
        assert_eq!(n, cfg.particle_count(0.1));
        assert_eq!(store.active().len(), n);
        assert!((gas.mass() - 10.1).abs() < 1e-12);
        assert!(valves.inlet_open());
        for p in store.active() {
            assert_eq!([p.r[0], p.r[1]], bounds.inlet());
            assert_eq!(p.pressure_ratio, 2.0);
            // heading stays inside the jet cone, pointing into the box
            let heading = p.v[1].atan2(p.v[0]);
            assert!(heading.abs() <= cfg.jet_half_angle + cfg.jet_jitter + 1e-12);
            assert!(p.v[0] > 0.0);
        }
    }

    #[test]
    fn eject_picks_nearest_with_insertion_tiebreak() {
        let (cfg, bounds, mut store, mut gas) = setup();
        let [ox, oy] = bounds.outlet();
        // ids 0 and 2 tie at distance 5, id 1 is farther, id 3 nearest
        store.push([ox - 5.0, oy, 0.0], [0.0; DIM], 300.0, 1.0);
        store.push([ox - 50.0, oy, 0.0], [0.0; DIM], 300.0, 1.0);
        store.push([ox, oy - 5.0, 0.0], [0.0; DIM], 300.0, 1.0);
        store.push([ox - 1.0, oy, 0.0], [0.0; DIM], 300.0, 1.0);

        let mut valves = ValveController::new();
        // two particles' worth of mass
        let mass = 2.0 * cfg.particle_molar_mass / (cfg.avogadro * cfg.particle_scale) * 1.0001;
        let n = valves.eject(&cfg, &bounds, &mut store, &mut gas, mass);
        assert_eq!(n, 2);
        let exiting: Vec<u64> = store.exiting().iter().map(|p| p.id).collect();
        assert_eq!(exiting, vec![0, 3]);
        assert!(valves.outlet_open(&store));
        for p in store.exiting() {
            assert!(p.exiting);
            assert!(p.v[0] > 0.0);
            assert!((p.v[0].hypot(p.v[1]) - cfg.exit_speed).abs() < 1e-12);
        }
    }

    #[test]
    fn eject_caps_at_population() {
        let (cfg, bounds, mut store, mut gas) = setup();
        store.push([400.0, 300.0, 0.0], [0.0; DIM], 300.0, 1.0);
        let mut valves = ValveController::new();
        let n = valves.eject(&cfg, &bounds, &mut store, &mut gas, 100.0);
        assert_eq!(n, 1);
        assert_eq!(gas.mass(), 0.0);
    }

    #[test]
    fn wall_hugging_particle_still_leaves() {
        let (cfg, bounds, mut store, mut gas) = setup();
        // on the right wall but far from the port vertically
        store.push([bounds.right(), bounds.top, 0.0], [0.0; DIM], 300.0, 1.0);
        let mut valves = ValveController::new();
        valves.eject(&cfg, &bounds, &mut store, &mut gas, 1.0);
        for _ in 0..200 {
            valves.advance_exiting(&cfg, &bounds, &mut store);
        }
        assert!(store.exiting()[0].is_faded());
        assert_eq!(store.prune_faded(), 1);
    }

    #[test]
    fn fading_continues_after_container_grows() {
        let (cfg, bounds, mut store, mut gas) = setup();
        store.push([bounds.right(), bounds.center_y(), 0.0], [0.0; DIM], 300.0, 1.0);
        let mut valves = ValveController::new();
        valves.eject(&cfg, &bounds, &mut store, &mut gas, 1.0);
        while store.exiting()[0].alpha == OPAQUE {
            valves.advance_exiting(&cfg, &bounds, &mut store);
        }

        let grown = Bounds::for_volume(&cfg, 40.0);
        assert!(store.exiting()[0].r[0] < grown.right() + cfg.fade_margin);
        let mut prev = store.exiting()[0].alpha;
        while !store.exiting()[0].is_faded() {
            valves.advance_exiting(&cfg, &grown, &mut store);
            let alpha = store.exiting()[0].alpha;
            assert!(alpha < prev, "alpha stalled at {prev}");
            prev = alpha;
        }
    }

    #[test]
    fn bad_mass_is_ignored() {
        let (cfg, bounds, mut store, mut gas) = setup();
        store.push([400.0, 300.0, 0.0], [0.0; DIM], 300.0, 1.0);
        let mut valves = ValveController::new();
        let mut rng = StdRng::seed_from_u64(3);
        for mass in [-1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(valves.inject(&cfg, &bounds, &mut store, &mut gas, mass, &mut rng), 0);
            assert_eq!(valves.eject(&cfg, &bounds, &mut store, &mut gas, mass), 0);
        }
        assert_eq!(gas.mass(), 10.0);
        assert_eq!(store.active().len(), 1);
        assert!(!valves.inlet_open() && !valves.outlet_open(&store));
    }

    #[test]
    fn inlet_indicator_counts_down() {
        let (mut cfg, bounds, mut store, mut gas) = setup();
        cfg.inlet_open_ticks = 2;
        let mut valves = ValveController::new();
        let mut rng = StdRng::seed_from_u64(1);
        valves.inject(&cfg, &bounds, &mut store, &mut gas, 0.1, &mut rng);
        valves.step();
        assert!(valves.inlet_open());
        valves.step();
        assert!(!valves.inlet_open());
    }
}
