//! Simulator-wide constants.

/// Hard cap on simulated clock cycles for a single run.
///
/// Guarantees termination for programs that loop forever (a branch back-edge with no
/// exit). Reaching the cap truncates the history; it is not an error.
pub const DEFAULT_MAX_CYCLES: u64 = 100;

/// Name of the section opened implicitly when the source does not start with a label.
pub const IMPLICIT_SECTION: &str = "main";

/// Default number of load/store buffers.
pub const DEFAULT_LOAD_STATIONS: usize = 3;

/// Default functional-unit delay of a load/store buffer.
///
/// One cycle of address computation plus two cycles of memory access.
pub const DEFAULT_LOAD_DELAY: u32 = 2 + 1;

/// Default number of adder (add/subtract) reservation stations.
pub const DEFAULT_ADD_STATIONS: usize = 3;

/// Default functional-unit delay of the adder.
pub const DEFAULT_ADD_DELAY: u32 = 2;

/// Default number of multiplier (multiply/divide) reservation stations.
pub const DEFAULT_MUL_STATIONS: usize = 2;

/// Default functional-unit delay of the multiplier.
pub const DEFAULT_MUL_DELAY: u32 = 5;
