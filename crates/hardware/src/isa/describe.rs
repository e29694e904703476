//! Plain-English descriptions of parsed instructions.
//!
//! Used by the `parse` CLI command and by renderers that show a tooltip next to each
//! line of the instruction queue.

use std::fmt;

use crate::isa::instruction::{AluOp, BranchCond, Instruction, InstructionKind};

/// Verb used for an arithmetic operation ("Adds", "Divides", ...).
const fn verb(op: AluOp) -> &'static str {
    match op {
        AluOp::Add => "Adds",
        AluOp::Sub => "Subtracts",
        AluOp::Mul => "Multiplies",
        AluOp::Div => "Divides",
    }
}

/// Phrase used for a branch predicate.
const fn predicate(cond: BranchCond) -> &'static str {
    match cond {
        BranchCond::Equal => "is equal to",
        BranchCond::NotEqual => "differs from",
        BranchCond::LessThan => "is less than",
        BranchCond::GreaterOrEqual => "is greater than or equal to",
    }
}

/// Describes what an instruction does, in one English sentence.
///
/// # Arguments
///
/// * `inst` - The instruction to describe.
///
/// # Returns
///
/// A sentence such as `"Loads from the address in a2, with offset 32, into register f6."`.
pub fn describe(inst: &Instruction) -> String {
    match &inst.kind {
        InstructionKind::Load { dest, base, offset } => {
            format!("Loads from the address in {base}, with offset {offset}, into register {dest}.")
        }
        InstructionKind::ImmediateLoad { dest, imm } => {
            format!("Loads the immediate value {imm} into register {dest}.")
        }
        InstructionKind::Store { src, base, offset } => {
            format!("Stores the value in {src} to the address in {base}, with offset {offset}.")
        }
        InstructionKind::Arithmetic { op, dest, lhs, rhs } => format!(
            "{} the value in {lhs} with the value in {rhs}, and stores the result in {dest}.",
            verb(*op)
        ),
        InstructionKind::ImmediateArithmetic { op, dest, lhs, imm } => format!(
            "{} the value in {lhs} with the value {imm}, and stores the result in {dest}.",
            verb(*op)
        ),
        InstructionKind::Branch {
            cond,
            lhs,
            rhs,
            target,
        } => format!(
            "Jumps to {target} if the value in {lhs} {} the value in {rhs}.",
            predicate(*cond)
        ),
        InstructionKind::Jump { target } => format!("Jumps to {target}."),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}
