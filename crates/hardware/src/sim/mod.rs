//! Simulation driver.
//!
//! Seeds the initial state, runs the cycle loop, and packages the resulting history.
//! It provides:
//! 1. **Seeding:** Example register and memory values for a parsed program.
//! 2. **Driver:** `simulate` / `simulate_source`, producing a [`Simulation`].
//! 3. **Templates:** Built-in example programs.

/// Initial register and memory values.
pub mod seed;

/// The clone-and-advance driver loop.
pub mod simulator;

/// Built-in example programs.
pub mod templates;

pub use simulator::{Completion, Simulation, simulate, simulate_source};
pub use templates::Template;
