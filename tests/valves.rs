use std::collections::HashMap;

use pressure_sim::core::Command;
use pressure_sim::error::Result;
use pressure_sim::{Engine, SimConfig};

fn engine(seed: u64) -> Result<Engine> {
    Engine::new(SimConfig {
        mass: 2.0,
        workers: 4,
        seed: Some(seed),
        ..SimConfig::default()
    })
}

/// Ejecting k particles' worth of mass marks exactly k as exiting; each fades
/// strictly once past the port and then disappears from the snapshot.
#[test]
fn eject_fades_and_prunes_exactly_k() -> Result<()> {
    let mut engine = engine(2024)?;
    engine.tick();
    let before = engine.particles().active().len();
    let k = engine.config().particle_count(0.1);
    assert!(k > 0);

    let sent = engine.release_gas(0.1);
    assert_eq!(sent, k);
    assert_eq!(engine.particles().exiting().len(), k);
    assert_eq!(engine.particles().active().len(), before - k);
    assert!(engine.particles().exiting().iter().all(|p| p.exiting));
    assert!(engine.particles().active().iter().all(|p| !p.exiting));
    assert!(engine.snapshot().outlet_open);

    let ids: Vec<u64> = engine.particles().exiting().iter().map(|p| p.id).collect();
    let mut last: HashMap<u64, u8> = ids.iter().map(|&id| (id, 255)).collect();
    let mut gone: HashMap<u64, u64> = HashMap::new();

    for _ in 0..2_000 {
        engine.tick();
        let now: HashMap<u64, u8> = engine
            .particles()
            .exiting()
            .iter()
            .map(|p| (p.id, p.alpha))
            .collect();
        for &id in &ids {
            if gone.contains_key(&id) {
                assert!(!now.contains_key(&id), "particle {id} came back");
                continue;
            }
            match now.get(&id) {
                Some(&alpha) => {
                    let prev = last[&id];
                    if prev < 255 {
                        assert!(alpha < prev, "alpha of {id} went {prev} -> {alpha}");
                    } else {
                        assert!(alpha <= prev);
                    }
                    last.insert(id, alpha);
                }
                None => {
                    assert_eq!(last[&id], 5, "particle {id} vanished before fading out");
                    gone.insert(id, engine.ticks());
                }
            }
        }
        if gone.len() == ids.len() {
            break;
        }
    }

    assert_eq!(gone.len(), k, "every ejected particle is eventually removed");
    let snap = engine.snapshot();
    assert_eq!(snap.particles.len(), before - k);
    assert!(snap.particles.iter().all(|p| p.alpha == 255));
    assert!(!snap.outlet_open);
    Ok(())
}

/// Injection adds the formula's count at the inlet and opens the inlet flag.
#[test]
fn inject_adds_particles_and_mass() -> Result<()> {
    let mut engine = engine(7)?;
    let n0 = engine.particles().len();
    let m0 = engine.gas().mass();

    engine.apply(Command::AddGas(0.1));
    let k = engine.config().particle_count(0.1);
    assert_eq!(engine.particles().len(), n0 + k);
    assert!((engine.gas().mass() - (m0 + 0.1)).abs() < 1e-12);

    let snap = engine.snapshot();
    assert!(snap.inlet_open);
    assert_eq!(snap.particles.len(), n0 + k);

    let inlet = engine.bounds().inlet();
    let fresh = &engine.particles().active()[n0..];
    assert!(fresh.iter().all(|p| p.r[0] == inlet[0] && p.r[1] == inlet[1]));
    assert!(fresh.iter().all(|p| p.pressure_ratio == 2.0));

    for _ in 0..engine.config().inlet_open_ticks {
        engine.tick();
    }
    assert!(!engine.snapshot().inlet_open);
    Ok(())
}

/// Releasing more than the container holds empties it without going negative.
#[test]
fn release_everything() -> Result<()> {
    let mut engine = engine(99)?;
    let n = engine.particles().active().len();
    let sent = engine.release_gas(1_000.0);
    assert_eq!(sent, n);
    assert_eq!(engine.gas().mass(), 0.0);
    assert_eq!(engine.gas().pressure(), 0.0);
    assert!(engine.particles().active().is_empty());
    for _ in 0..2_000 {
        if engine.particles().is_empty() {
            break;
        }
        engine.tick();
    }
    assert!(engine.particles().is_empty());
    assert!(engine.snapshot().particles.is_empty());
    Ok(())
}

/// Add then release the same mass: population and mass return to where they started.
#[test]
fn add_then_release_round_trip() -> Result<()> {
    let mut engine = engine(5)?;
    let n0 = engine.particles().active().len();
    engine.apply(Command::AddGas(0.25));
    engine.tick();
    engine.apply(Command::ReleaseGas(0.25));
    assert_eq!(engine.particles().active().len(), n0);
    assert!((engine.gas().mass() - 2.0).abs() < 1e-12);
    Ok(())
}

/// Negative or NaN masses move nothing through either port.
#[test]
fn bad_mass_commands_are_ignored() -> Result<()> {
    let mut engine = Engine::new(SimConfig {
        mass: 1.0,
        workers: 2,
        seed: Some(17),
        ..SimConfig::default()
    })?;
    let n0 = engine.particles().len();
    let p0 = engine.gas().pressure();

    for mass in [-5.0, -1.0, f64::NAN] {
        engine.apply(Command::AddGas(mass));
        engine.apply(Command::ReleaseGas(mass));
    }
    assert_eq!(engine.gas().mass(), 1.0);
    assert_eq!(engine.gas().pressure(), p0);
    assert_eq!(engine.particles().len(), n0);
    assert_eq!(n0, engine.config().particle_count(engine.gas().mass()));
    assert!(engine.particles().exiting().is_empty());

    let snap = engine.snapshot();
    assert!(!snap.inlet_open && !snap.outlet_open);
    Ok(())
}
