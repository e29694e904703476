//! Common utilities and types shared by every part of the simulator.
//!
//! This module provides:
//! 1. **Constants:** Cycle cap, implicit section name and default pool shape.
//! 2. **Error Handling:** Input and configuration error types.
//! 3. **Values:** Formatting of simulated numbers for display and narration.
//! 4. **Generator:** Deterministic example values for registers and memory.

/// Simulator-wide constants.
pub mod constants;

/// Error types for input and configuration problems.
pub mod error;

/// Deterministic example values keyed by register name.
pub mod generator;

/// Numeric display helpers.
pub mod value;

pub use constants::{DEFAULT_MAX_CYCLES, IMPLICIT_SECTION};
pub use error::{ConfigError, SimError};
pub use generator::instruction_value;
pub use value::format_value;
