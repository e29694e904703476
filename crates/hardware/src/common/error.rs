//! Error definitions for the simulator.
//!
//! The simulation itself never fails: stalls, unknown source lines and the cycle cap are
//! all ordinary outcomes. Errors only arise at the edges of the crate:
//! 1. **Input:** Source text that contains nothing to simulate.
//! 2. **Configuration:** Malformed or nonsensical configuration trees.

use thiserror::Error;

/// Errors raised while preparing a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// The source text contained no recognizable instruction.
    ///
    /// Empty input and label-only input both end up here; callers are expected to
    /// decline to simulate rather than report a failure to the user.
    #[error("nothing to simulate: the source contains no recognizable instruction")]
    EmptyProgram,

    /// The supplied configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for the config schema.
    #[error("malformed configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Every station class was configured with zero stations.
    #[error("the reservation station pool is empty")]
    EmptyPool,

    /// A station class has a functional unit that takes no cycles.
    #[error("station class `{name}` must have a functional-unit delay of at least one cycle")]
    ZeroDelay {
        /// Name prefix of the offending station class (e.g. `Load`).
        name: &'static str,
    },

    /// The cycle cap would stop the simulation before its first cycle.
    #[error("max_cycles must be at least 1")]
    ZeroCycleLimit,
}
