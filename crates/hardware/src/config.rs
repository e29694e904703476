//! Configuration system for the Tomasulo simulator.
//!
//! This module defines all configuration structures used to parameterize a run. It
//! provides:
//! 1. **Defaults:** The textbook machine (three load buffers, three adder stations, two
//!    multiplier stations) and the 100-cycle safety cap.
//! 2. **Structures:** Hierarchical config for general limits, program display and the
//!    reservation station pool.
//! 3. **Validation:** Rejection of configurations that could not run a single cycle.
//!
//! Configuration is supplied as JSON (CLI `--config`, WebAssembly entry point) or built
//! with `Config::default()`.

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;
use crate::core::station::StationClass;

/// Default configuration constants for the simulator.
mod defaults {
    use crate::common::constants;

    /// Cycle cap applied when none is configured.
    pub const MAX_CYCLES: u64 = constants::DEFAULT_MAX_CYCLES;

    /// Load/store buffer count.
    pub const LOAD_COUNT: usize = constants::DEFAULT_LOAD_STATIONS;
    /// Load/store functional-unit delay.
    pub const LOAD_DELAY: u32 = constants::DEFAULT_LOAD_DELAY;

    /// Adder station count.
    pub const ADD_COUNT: usize = constants::DEFAULT_ADD_STATIONS;
    /// Adder functional-unit delay.
    pub const ADD_DELAY: u32 = constants::DEFAULT_ADD_DELAY;

    /// Multiplier station count.
    pub const MUL_COUNT: usize = constants::DEFAULT_MUL_STATIONS;
    /// Multiplier functional-unit delay.
    pub const MUL_DELAY: u32 = constants::DEFAULT_MUL_DELAY;
}

/// Root configuration structure.
///
/// Every section is optional in the JSON form; missing sections and fields fall back to
/// the defaults documented on each field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Config {
    /// Run-wide limits.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Program navigator settings.
    #[serde(default)]
    pub program: ProgramConfig,

    /// Reservation station pool shape.
    #[serde(default)]
    pub stations: StationsConfig,
}

impl Config {
    /// Parses and validates a configuration from a JSON document.
    ///
    /// # Arguments
    ///
    /// * `json` - The JSON document; `{}` yields the default configuration.
    ///
    /// # Returns
    ///
    /// The validated configuration, or the parse/validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive at least one cycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.max_cycles == 0 {
            return Err(ConfigError::ZeroCycleLimit);
        }
        let mut total = 0;
        for (class, pool) in self.stations.classes() {
            if pool.count > 0 && pool.delay == 0 {
                return Err(ConfigError::ZeroDelay {
                    name: class.prefix(),
                });
            }
            total += pool.count;
        }
        if total == 0 {
            return Err(ConfigError::EmptyPool);
        }
        Ok(())
    }
}

/// General run settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Maximum number of cycles simulated before the run is truncated.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default cycle cap.
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Program navigator settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ProgramConfig {
    /// Maximum number of instructions in the lookahead window shown by renderers.
    ///
    /// `None` shows every remaining instruction.
    #[serde(default)]
    pub queue_window: Option<usize>,
}

/// Shape of one class of reservation stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Number of stations in the class.
    pub count: usize,
    /// Cycles the class's functional unit needs per instruction.
    pub delay: u32,
}

/// Reservation station pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StationsConfig {
    /// Load/store buffers (`Load1..N`).
    #[serde(default = "StationsConfig::default_load")]
    pub load: PoolConfig,

    /// Add/subtract stations (`Add1..N`).
    #[serde(default = "StationsConfig::default_add")]
    pub add: PoolConfig,

    /// Multiply/divide stations (`Mul1..N`).
    #[serde(default = "StationsConfig::default_mul")]
    pub mul: PoolConfig,
}

impl StationsConfig {
    /// Returns the default load/store pool.
    fn default_load() -> PoolConfig {
        PoolConfig {
            count: defaults::LOAD_COUNT,
            delay: defaults::LOAD_DELAY,
        }
    }

    /// Returns the default adder pool.
    fn default_add() -> PoolConfig {
        PoolConfig {
            count: defaults::ADD_COUNT,
            delay: defaults::ADD_DELAY,
        }
    }

    /// Returns the default multiplier pool.
    fn default_mul() -> PoolConfig {
        PoolConfig {
            count: defaults::MUL_COUNT,
            delay: defaults::MUL_DELAY,
        }
    }

    /// Iterates the station classes in pool order (load, add, mul).
    pub fn classes(&self) -> [(StationClass, PoolConfig); 3] {
        [
            (StationClass::LoadStore, self.load),
            (StationClass::Add, self.add),
            (StationClass::Mul, self.mul),
        ]
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            load: Self::default_load(),
            add: Self::default_add(),
            mul: Self::default_mul(),
        }
    }
}
