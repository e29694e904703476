//! Tomasulo out-of-order execution simulator.
//!
//! This crate implements a cycle-accurate model of the Tomasulo algorithm over a small
//! RISC-V-like instruction subset, producing a full history of inspectable states:
//! 1. **ISA:** Assembly parser, instruction sum type and English descriptions.
//! 2. **Core:** Registers with producer tags, reservation stations, memory, the
//!    program navigator and the six-phase cycle.
//! 3. **Simulation:** Seeding, the driver loop and built-in templates.
//! 4. **Configuration and statistics:** Station pool shape, cycle cap and run counters.
//!
//! ```
//! use tomasim_core::{Config, simulate_source};
//!
//! let sim = simulate_source("fmul.s f4, f1, f2\nfadd.s f5, f1, f4", &Config::default()).unwrap();
//! assert!(sim.states.len() > 1);
//! ```

/// Common types and constants (errors, value formatting, value generator).
pub mod common;
/// Simulator configuration (defaults, station pool, limits).
pub mod config;
/// Machine state and the per-cycle scheduler.
pub mod core;
/// Instruction set (parser, instruction, descriptions).
pub mod isa;
/// Seeding, driver loop and templates.
pub mod sim;
/// Run statistics.
pub mod stats;

/// Error raised while preparing a run.
pub use crate::common::{ConfigError, SimError};
/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// One machine snapshot; advance it with `State::next_cycle`.
pub use crate::core::State;
/// Parsed program; produced by `isa::parse`.
pub use crate::isa::Listing;
/// Driver entry points and their result.
pub use crate::sim::{Completion, Simulation, Template, simulate, simulate_source};
/// Run statistics.
pub use crate::stats::SimStats;
