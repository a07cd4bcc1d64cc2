use serde::{Deserialize, Serialize};

/// Host request applied between ticks.
///
/// Step sizes for the increase/decrease variants come from
/// [`SimConfig`](crate::config::SimConfig) (`volume_step`, `temperature_step`).
/// Serialized externally tagged: `"IncreaseVolume"`, `{"AddGas": 0.1}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    IncreaseVolume,
    DecreaseVolume,
    IncreaseTemperature,
    DecreaseTemperature,
    /// Inject this many kilograms through the inlet.
    AddGas(f64),
    /// Release this many kilograms through the outlet.
    ReleaseGas(f64),
}

/// Command with the tick it should run before; used by scripted drivers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub at: u64,
    pub command: Command,
}
