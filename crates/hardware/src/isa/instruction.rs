//! Parsed instruction representation.
//!
//! An [`Instruction`] is the immutable result of parsing one source line. It pairs the
//! display data (source line, mnemonic, position in the listing) with an
//! [`InstructionKind`], a closed sum type with one variant per instruction form.
//! Operands are kept as register *names*; the simulator's register file is keyed by name
//! and never needs an encoding.

use serde::Serialize;

/// Operation class used to match instructions against reservation stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpClass {
    /// Memory read into a register.
    Load,
    /// Memory write from a register.
    Store,
    /// Addition (including `li`, which expands to an add with zero).
    Add,
    /// Subtraction.
    Subtract,
    /// Multiplication.
    Multiply,
    /// Division.
    Divide,
    /// Conditional branch or unconditional jump.
    Branch,
}

impl OpClass {
    /// Returns true for classes handled by the load/store buffers.
    pub const fn is_memory(self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }
}

/// Arithmetic operation performed by an adder or multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AluOp {
    /// `lhs + rhs`
    Add,
    /// `lhs - rhs`
    Sub,
    /// `lhs * rhs`
    Mul,
    /// `lhs / rhs` (IEEE semantics, division by zero yields an infinity or NaN)
    Div,
}

impl AluOp {
    /// Applies the operation to two operand values.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }

    /// Returns the station-matching class of the operation.
    pub const fn class(self) -> OpClass {
        match self {
            Self::Add => OpClass::Add,
            Self::Sub => OpClass::Subtract,
            Self::Mul => OpClass::Multiply,
            Self::Div => OpClass::Divide,
        }
    }

    /// Infix symbol used in narration.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// Comparison predicate of a conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchCond {
    /// `beq`
    Equal,
    /// `bne`
    NotEqual,
    /// `blt`, `bltu`
    LessThan,
    /// `bge`, `bgeu`
    GreaterOrEqual,
}

impl BranchCond {
    /// Evaluates the predicate on the two operand values.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::LessThan => lhs < rhs,
            Self::GreaterOrEqual => lhs >= rhs,
        }
    }

    /// Infix symbol used in narration.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::GreaterOrEqual => ">=",
        }
    }
}

/// Operands of an instruction, one variant per supported form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum InstructionKind {
    /// `lw rd, offset(base)` / `lw rd, base, offset`
    Load {
        /// Destination register.
        dest: String,
        /// Register holding the base address.
        base: String,
        /// Constant added to the base address.
        offset: i64,
    },
    /// `li rd, imm`
    ImmediateLoad {
        /// Destination register.
        dest: String,
        /// Value loaded.
        imm: i64,
    },
    /// `sw rs, offset(base)` / `sw rs, base, offset`
    Store {
        /// Register holding the value to store.
        src: String,
        /// Register holding the base address.
        base: String,
        /// Constant added to the base address.
        offset: i64,
    },
    /// `add rd, rs1, rs2`
    Arithmetic {
        /// Operation performed.
        op: AluOp,
        /// Destination register.
        dest: String,
        /// Left operand register.
        lhs: String,
        /// Right operand register.
        rhs: String,
    },
    /// `addi rd, rs1, imm`
    ImmediateArithmetic {
        /// Operation performed.
        op: AluOp,
        /// Destination register.
        dest: String,
        /// Left operand register.
        lhs: String,
        /// Right operand constant.
        imm: i64,
    },
    /// `blt rs1, rs2, label`
    Branch {
        /// Predicate deciding whether the branch is taken.
        cond: BranchCond,
        /// Left operand register.
        lhs: String,
        /// Right operand register.
        rhs: String,
        /// Label fetched next when the predicate holds.
        target: String,
    },
    /// `j label`
    Jump {
        /// Label fetched next.
        target: String,
    },
}

/// A parsed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Normalized source line, used for display.
    pub line: String,
    /// Mnemonic as written (`fadd.s`, `lw`, ...).
    pub mnemonic: String,
    /// Position in the flat instruction list; stable identity for timeline columns.
    pub code_order: usize,
    /// Operands.
    pub kind: InstructionKind,
}

impl Instruction {
    /// Returns the station-matching class of this instruction.
    ///
    /// `li` reports [`OpClass::Add`]: it executes on an adder as `imm + 0`.
    pub const fn class(&self) -> OpClass {
        match &self.kind {
            InstructionKind::Load { .. } => OpClass::Load,
            InstructionKind::Store { .. } => OpClass::Store,
            InstructionKind::ImmediateLoad { .. } => OpClass::Add,
            InstructionKind::Arithmetic { op, .. }
            | InstructionKind::ImmediateArithmetic { op, .. } => op.class(),
            InstructionKind::Branch { .. } | InstructionKind::Jump { .. } => OpClass::Branch,
        }
    }

    /// Returns true for branches and jumps, which never occupy a reservation station.
    pub const fn is_control(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::Branch { .. } | InstructionKind::Jump { .. }
        )
    }

    /// Names of the registers this instruction reads, without duplicates.
    pub fn src_registers(&self) -> Vec<&str> {
        let names: Vec<&str> = match &self.kind {
            InstructionKind::Load { base, .. } => vec![base.as_str()],
            InstructionKind::ImmediateLoad { .. } | InstructionKind::Jump { .. } => Vec::new(),
            InstructionKind::Store { src, base, .. } => vec![src.as_str(), base.as_str()],
            InstructionKind::Arithmetic { lhs, rhs, .. }
            | InstructionKind::Branch { lhs, rhs, .. } => vec![lhs.as_str(), rhs.as_str()],
            InstructionKind::ImmediateArithmetic { lhs, .. } => vec![lhs.as_str()],
        };
        let mut unique = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        unique
    }

    /// Names of the registers this instruction writes.
    pub fn dest_registers(&self) -> Vec<&str> {
        match &self.kind {
            InstructionKind::Load { dest, .. }
            | InstructionKind::ImmediateLoad { dest, .. }
            | InstructionKind::Arithmetic { dest, .. }
            | InstructionKind::ImmediateArithmetic { dest, .. } => vec![dest.as_str()],
            InstructionKind::Store { .. }
            | InstructionKind::Branch { .. }
            | InstructionKind::Jump { .. } => Vec::new(),
        }
    }

    /// Symbolic address `(base register, offset)` of a load or store.
    pub fn memory_operand(&self) -> Option<(&str, i64)> {
        match &self.kind {
            InstructionKind::Load { base, offset, .. }
            | InstructionKind::Store { base, offset, .. } => Some((base.as_str(), *offset)),
            _ => None,
        }
    }

    /// Label this instruction may redirect fetch to.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            InstructionKind::Branch { target, .. } | InstructionKind::Jump { target } => {
                Some(target.as_str())
            }
            _ => None,
        }
    }
}
