use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::SimConfig;
use crate::core::{Command, Engine};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python-facing wrapper so a Python renderer can drive the engine.
///
/// API:
/// - __new__(seed=None, workers=None, config_json=None)
/// - increase_volume(), decrease_volume(), increase_temperature(), decrease_temperature()
/// - add_gas(mass), release_gas(mass)
/// - tick()
/// - get_particles() -> np.ndarray, shape (N, 3): x, y, alpha
/// - get_gas_state() -> (volume, temperature, mass, pressure)
/// - get_bounds() -> (left, top, width, height)
/// - get_valves() -> (inlet_open, outlet_open)
#[pyclass]
pub struct GasEngine {
    engine: Engine,
}

#[pymethods]
impl GasEngine {
    /// Create an engine from defaults, optionally overridden by a JSON
    /// document and the `seed`/`workers` keywords.
    ///
    /// Errors: raises ValueError on invalid configuration.
    #[new]
    #[pyo3(signature = (seed=None, workers=None, config_json=None))]
    fn new(seed: Option<u64>, workers: Option<usize>, config_json: Option<&str>) -> PyResult<Self> {
        let mut cfg = match config_json {
            Some(text) => SimConfig::from_json_str(text).map_err(py_err)?,
            None => SimConfig::default(),
        };
        if seed.is_some() {
            cfg.seed = seed;
        }
        if let Some(w) = workers {
            cfg.workers = w;
        }
        let engine = Engine::new(cfg).map_err(py_err)?;
        Ok(Self { engine })
    }

    fn increase_volume(&mut self) {
        self.engine.apply(Command::IncreaseVolume);
    }

    fn decrease_volume(&mut self) {
        self.engine.apply(Command::DecreaseVolume);
    }

    fn increase_temperature(&mut self) {
        self.engine.apply(Command::IncreaseTemperature);
    }

    fn decrease_temperature(&mut self) {
        self.engine.apply(Command::DecreaseTemperature);
    }

    /// Inject `mass` kg through the inlet; returns the number of particles added.
    fn add_gas(&mut self, mass: f64) -> PyResult<usize> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(py_err("mass must be a non-negative finite float"));
        }
        Ok(self.engine.add_gas(mass))
    }

    /// Release `mass` kg through the outlet; returns the number of particles leaving.
    fn release_gas(&mut self, mass: f64) -> PyResult<usize> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(py_err("mass must be a non-negative finite float"));
        }
        Ok(self.engine.release_gas(mass))
    }

    /// Advance one frame (releases the GIL during computation).
    fn tick(&mut self, py: Python<'_>) -> usize {
        py.detach(|| self.engine.tick()).contacts
    }

    /// Drawable particles as a NumPy array of shape (N, 3), dtype=float64.
    fn get_particles<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let snap = self.engine.snapshot();
        let mut arr = Array2::<f64>::zeros((snap.particles.len(), 3));
        for (i, p) in snap.particles.iter().enumerate() {
            arr[[i, 0]] = p.x;
            arr[[i, 1]] = p.y;
            arr[[i, 2]] = f64::from(p.alpha);
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    fn get_gas_state(&self) -> (f64, f64, f64, f64) {
        let g = self.engine.gas();
        (g.volume(), g.temperature(), g.mass(), g.pressure())
    }

    fn get_bounds(&self) -> (f64, f64, f64, f64) {
        let b = self.engine.bounds();
        (b.left, b.top, b.width, b.height)
    }

    fn get_valves(&self) -> (bool, bool) {
        (self.engine.inlet_open(), self.engine.outlet_open())
    }
}

/// The pressure_sim Python module entry point.
#[pymodule]
fn pressure_sim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<GasEngine>()?;
    Ok(())
}
