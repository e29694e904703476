//! Instruction set supported by the simulator.
//!
//! A small RISC-V-flavoured subset: loads, stores, immediate loads, the four arithmetic
//! operations (integer and `f`-prefixed floating forms), conditional branches and an
//! unconditional jump.
//!
//! # Modules
//!
//! * `asm`: Source text parser producing a [`Listing`].
//! * `instruction`: The parsed instruction sum type.
//! * `describe`: English descriptions for display.

/// Assembly parser (labels, sections, directives, instruction families).
pub mod asm;

/// Plain-English instruction descriptions.
pub mod describe;

/// Parsed instruction representation and operation classes.
pub mod instruction;

pub use asm::{Listing, parse};
pub use describe::describe;
pub use instruction::{AluOp, BranchCond, Instruction, InstructionKind, OpClass};
