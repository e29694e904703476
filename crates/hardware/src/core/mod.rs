//! Core Tomasulo machine.
//!
//! This module contains the machine state and the per-cycle scheduler:
//! 1. **Program:** Fetch cursor over the shared instruction listing.
//! 2. **Registers:** Named virtual registers with producer tags.
//! 3. **Stations:** The fixed reservation station pool.
//! 4. **Memory:** Sparse data memory and the ordering guards protecting it.
//! 5. **Engine:** `State::next_cycle`, the six-phase cycle.

/// Per-cycle scheduler (`State::next_cycle`).
pub mod engine;

/// Load/store ordering guards.
pub mod hazards;

/// Sparse data memory.
pub mod memory;

/// Program navigator (fetch cursor and lookahead queue).
pub mod program;

/// Named virtual registers.
pub mod register;

/// Machine state snapshots and cycle reports.
pub mod state;

/// Reservation stations and the station pool.
pub mod station;

pub use self::program::Program;
pub use self::state::{Action, CycleReport, State, SubStep};
