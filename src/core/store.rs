use std::f64::consts::PI;

use rand::Rng;

use crate::config::SimConfig;
use crate::core::bounds::Bounds;
use crate::core::particle::{nominal_speed, velocity_from_angles, Particle, DIM};

/// Owner of every live particle.
///
/// Active particles collide and bounce; exiting particles have been claimed by
/// the outlet and only drift and fade. Both vectors keep insertion order, which
/// the outlet relies on for tie-breaking.
#[derive(Debug, Default)]
pub struct ParticleStore {
    active: Vec<Particle>,
    exiting: Vec<Particle>,
    next_id: u64,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn active(&self) -> &[Particle] {
        &self.active
    }

    #[inline]
    pub fn active_mut(&mut self) -> &mut [Particle] {
        &mut self.active
    }

    #[inline]
    pub fn exiting(&self) -> &[Particle] {
        &self.exiting
    }

    #[inline]
    pub fn exiting_mut(&mut self) -> &mut [Particle] {
        &mut self.exiting
    }

    /// Number of live particles, active and exiting.
    pub fn len(&self) -> usize {
        self.active.len() + self.exiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.exiting.is_empty()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &Particle> {
        self.active.iter().chain(self.exiting.iter())
    }

    /// Append an active particle with the next id.
    pub fn push(&mut self, r: [f64; DIM], v: [f64; DIM], temperature: f64, pressure_ratio: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(Particle::new(id, r, v, temperature, pressure_ratio));
        id
    }

    /// Replace the whole population with the count `mass` represents.
    ///
    /// Particles are scattered uniformly through `bounds` with unit pressure
    /// ratio and a uniformly random heading. Exiting particles are discarded.
    pub fn populate<R: Rng>(
        &mut self,
        cfg: &SimConfig,
        bounds: &Bounds,
        mass: f64,
        temperature: f64,
        rng: &mut R,
    ) -> usize {
        let count = cfg.particle_count(mass);
        self.active.clear();
        self.exiting.clear();
        self.active.reserve(count);

        let speed = nominal_speed(temperature, 1.0);
        let half_depth = bounds.half_depth();
        for _ in 0..count {
            let r = [
                sample(rng, bounds.left, bounds.right()),
                sample(rng, bounds.top, bounds.bottom()),
                sample(rng, -half_depth, half_depth),
            ];
            let azimuth = rng.random_range(-PI..PI);
            let elevation = sample(rng, -cfg.max_elevation, cfg.max_elevation);
            let v = velocity_from_angles(speed, azimuth, elevation);
            self.push(r, v, temperature, 1.0);
        }
        count
    }

    /// Move the active particles at `indices` (ascending) to the exiting set,
    /// preserving relative order in both vectors. Returns the moved ids.
    pub fn take_exiting(&mut self, indices: &[usize]) -> Vec<u64> {
        if indices.is_empty() {
            return Vec::new();
        }
        let mut selected = vec![false; self.active.len()];
        for &i in indices {
            if let Some(flag) = selected.get_mut(i) {
                *flag = true;
            }
        }
        let mut moved = Vec::with_capacity(indices.len());
        let mut kept = Vec::with_capacity(self.active.len().saturating_sub(indices.len()));
        for (mut p, take) in self.active.drain(..).zip(selected) {
            if take {
                moved.push(p.id);
                p.exiting = true;
                self.exiting.push(p);
            } else {
                kept.push(p);
            }
        }
        self.active = kept;
        moved
    }

    /// Drop exiting particles whose opacity reached zero. Returns how many.
    pub fn prune_faded(&mut self) -> usize {
        let before = self.exiting.len();
        self.exiting.retain(|p| !p.is_faded());
        before - self.exiting.len()
    }
}

/// Uniform sample on `[lo, hi]`, tolerating an empty range.
fn sample<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn populate_uses_mass_formula() {
        let cfg = SimConfig::default();
        let bounds = Bounds::for_volume(&cfg, cfg.volume);
        let mut rng = StdRng::seed_from_u64(1);
        let mut store = ParticleStore::new();
        let n = store.populate(&cfg, &bounds, 10.0, 300.0, &mut rng);
        assert_eq!(n, 1881);
        assert_eq!(store.active().len(), 1881);
        for p in store.active() {
            assert!(p.r[0] >= bounds.left && p.r[0] <= bounds.right());
            assert!(p.r[1] >= bounds.top && p.r[1] <= bounds.bottom());
            assert!(p.r[2].abs() <= bounds.half_depth());
            assert!((p.speed() - nominal_speed(300.0, 1.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn populate_replaces_previous_population() {
        let cfg = SimConfig::default();
        let bounds = Bounds::for_volume(&cfg, cfg.volume);
        let mut rng = StdRng::seed_from_u64(2);
        let mut store = ParticleStore::new();
        store.populate(&cfg, &bounds, 1.0, 300.0, &mut rng);
        store.take_exiting(&[0, 1]);
        let n = store.populate(&cfg, &bounds, 0.5, 300.0, &mut rng);
        assert_eq!(store.len(), n);
        assert!(store.exiting().is_empty());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut store = ParticleStore::new();
        let a = store.push([0.0; DIM], [0.0; DIM], 300.0, 1.0);
        let b = store.push([0.0; DIM], [0.0; DIM], 300.0, 1.0);
        assert!(b > a);
    }

    #[test]
    fn take_exiting_preserves_order() {
        let mut store = ParticleStore::new();
        for i in 0..5 {
            store.push([i as f64, 0.0, 0.0], [0.0; DIM], 300.0, 1.0);
        }
        let moved = store.take_exiting(&[1, 3]);
        assert_eq!(moved, vec![1, 3]);
        let left: Vec<u64> = store.active().iter().map(|p| p.id).collect();
        assert_eq!(left, vec![0, 2, 4]);
        assert!(store.exiting().iter().all(|p| p.exiting));
    }

    #[test]
    fn prune_drops_only_faded() {
        let mut store = ParticleStore::new();
        for _ in 0..3 {
            store.push([0.0; DIM], [0.0; DIM], 300.0, 1.0);
        }
        store.take_exiting(&[0, 1]);
        store.exiting_mut()[0].alpha = 0;
        assert_eq!(store.prune_faded(), 1);
        assert_eq!(store.len(), 2);
    }
}
