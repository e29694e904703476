//! Initial machine state.
//!
//! Registers are created for every name the program mentions:
//! 1. **Read before written:** Ready with a directive value, or a generated one.
//! 2. **Written first:** Empty (or the directive value, if one names it).
//!
//! Every load whose base register already holds a value when it is seen pre-fills the
//! memory cell it will read, so early loads find data.

use tracing::trace;

use crate::common::generator::instruction_value;
use crate::core::memory::Memory;
use crate::core::register::{Register, RegisterFile};
use crate::isa::asm::Listing;
use crate::isa::instruction::{InstructionKind, OpClass};

/// Builds the initial register file and memory for a listing.
///
/// # Arguments
///
/// * `listing` - The parsed program; instructions are visited in code order.
///
/// # Returns
///
/// The seeded registers and memory.
pub fn seed(listing: &Listing) -> (RegisterFile, Memory) {
    let mut registers = RegisterFile::new();
    let mut memory = Memory::new();
    let directive = |name: &str| listing.initial_values.get(name).copied();

    for inst in &listing.instructions {
        for name in inst.src_registers() {
            if registers.contains(name) {
                continue;
            }
            let value = directive(name)
                .unwrap_or_else(|| instruction_value(name, &inst.mnemonic, inst.class()));
            trace!(register = name, value, "seeded register");
            registers.insert(name, Register::Ready(value));
        }

        if let InstructionKind::Load { dest, base, offset } = &inst.kind {
            if let Some(base_value) = registers.get(base).value() {
                let addr = (base_value + *offset as f64) as i64;
                memory.write(addr, instruction_value(dest, &inst.mnemonic, OpClass::Load));
            }
        }

        for name in inst.dest_registers() {
            if !registers.contains(name) {
                let reg = directive(name).map_or(Register::Empty, Register::Ready);
                registers.insert(name, reg);
            }
        }
    }
    (registers, memory)
}
