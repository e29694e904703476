//! Assembly parser.
//!
//! Turns free-form source text into a [`Listing`]: the flat instruction list, the label
//! table, the order in which labeled sections appear, and initial register values
//! declared with `# reg = value` directive comments.
//!
//! The parser is deliberately forgiving. Lines that do not match any supported
//! instruction form are skipped, and input without a single recognizable instruction
//! yields `None` rather than an error.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::common::IMPLICIT_SECTION;
use crate::isa::instruction::{AluOp, BranchCond, Instruction, InstructionKind};

/// Immutable result of parsing a program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// All recognized instructions, indexed by code order.
    pub instructions: Vec<Instruction>,
    /// Section name to the code orders of its instructions, in source order.
    pub sections: BTreeMap<String, Vec<usize>>,
    /// Section names in the order they first appear.
    pub section_order: Vec<String>,
    /// Initial register values declared by directive comments.
    pub initial_values: BTreeMap<String, f64>,
}

impl Listing {
    /// Returns the instructions of a section, or an empty slice for unknown names.
    pub fn section(&self, name: &str) -> &[usize] {
        self.sections.get(name).map_or(&[], Vec::as_slice)
    }

    /// Number of instructions in the listing.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the listing holds no instruction.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Instruction families, selected by mnemonic before operands are examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Load,
    ImmediateLoad,
    Store,
    Alu(AluOp),
    AluImmediate(AluOp),
    Branch(BranchCond),
    Jump,
}

/// Parses a complete program.
///
/// # Arguments
///
/// * `source` - Program text; `#` starts a comment, `label:` opens a section.
///
/// # Returns
///
/// The parsed listing, or `None` when the text contains no recognizable instruction
/// (empty input, label-only input, or nothing but unsupported lines).
pub fn parse(source: &str) -> Option<Listing> {
    let mut initial_values = BTreeMap::new();
    let mut lines = Vec::new();
    for raw in source.lines() {
        let (code, comment) = match raw.split_once('#') {
            Some((code, comment)) => (code, Some(comment)),
            None => (raw, None),
        };
        if let Some((name, value)) = comment.and_then(parse_directive) {
            let _ = initial_values.insert(name, value);
        }
        let normalized = code.split_whitespace().collect::<Vec<_>>().join(" ");
        if !normalized.is_empty() {
            lines.push(normalized);
        }
    }

    let mut instructions: Vec<Instruction> = Vec::new();
    let mut sections: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut section_order: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for (i, line) in lines.iter().enumerate() {
        let (label, body) = split_label(line);
        let label = match label {
            Some(label) => Some(label.to_string()),
            None if i == 0 => Some(IMPLICIT_SECTION.to_string()),
            None => None,
        };

        if let Some(label) = label {
            if current.as_deref() != Some(label.as_str()) {
                if !section_order.contains(&label) {
                    section_order.push(label.clone());
                }
                current = Some(label);
            }
        }
        let Some(section) = current.as_ref() else {
            continue;
        };
        let indices = sections.entry(section.clone()).or_default();

        if body.is_empty() {
            continue;
        }
        match parse_instruction(body) {
            Some((mnemonic, kind)) => {
                let code_order = instructions.len();
                instructions.push(Instruction {
                    line: body.to_string(),
                    mnemonic,
                    code_order,
                    kind,
                });
                indices.push(code_order);
            }
            None => debug!(line = body, "skipping unrecognized source line"),
        }
    }

    if instructions.is_empty() || section_order.is_empty() {
        return None;
    }

    Some(Listing {
        instructions,
        sections,
        section_order,
        initial_values,
    })
}

/// Splits a leading `label:` off a normalized line.
fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.split_once(':') {
        Some((label, rest)) if !label.trim().is_empty() => (Some(label.trim()), rest.trim()),
        _ => (None, line),
    }
}

/// Parses a `reg = value` directive from the text following a `#`.
fn parse_directive(comment: &str) -> Option<(String, f64)> {
    let (name, value) = comment.split_once('=')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    let value = value.trim_start();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(value.len(), |(i, _)| i);
    let number = value[..end].parse::<f64>().ok()?;
    Some((name.to_string(), number))
}

/// Parses one instruction (label already removed).
///
/// Returns the mnemonic and operands, or `None` for unsupported lines.
fn parse_instruction(line: &str) -> Option<(String, InstructionKind)> {
    let (mnemonic, rest) = line.split_once(' ').unwrap_or((line, ""));
    let family = classify(mnemonic)?;
    let ops: Vec<&str> = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    let kind = match family {
        Family::Load => {
            let dest = register(ops.first()?)?;
            let (base, offset) = memory_operand(&ops[1..])?;
            InstructionKind::Load { dest, base, offset }
        }
        Family::ImmediateLoad => InstructionKind::ImmediateLoad {
            dest: register(ops.first()?)?,
            imm: immediate(ops.get(1)?)?,
        },
        Family::Store => {
            let src = register(ops.first()?)?;
            let (base, offset) = memory_operand(&ops[1..])?;
            InstructionKind::Store { src, base, offset }
        }
        Family::Alu(op) => {
            let dest = register(ops.first()?)?;
            let lhs = register(ops.get(1)?)?;
            let rhs = ops.get(2)?;
            match immediate(rhs) {
                Some(imm) => InstructionKind::ImmediateArithmetic { op, dest, lhs, imm },
                None => InstructionKind::Arithmetic {
                    op,
                    dest,
                    lhs,
                    rhs: register(rhs)?,
                },
            }
        }
        Family::AluImmediate(op) => InstructionKind::ImmediateArithmetic {
            op,
            dest: register(ops.first()?)?,
            lhs: register(ops.get(1)?)?,
            imm: immediate(ops.get(2)?)?,
        },
        Family::Branch(cond) => InstructionKind::Branch {
            cond,
            lhs: register(ops.first()?)?,
            rhs: register(ops.get(1)?)?,
            target: word(ops.get(2)?)?,
        },
        Family::Jump => InstructionKind::Jump {
            target: word(ops.first()?)?,
        },
    };
    Some((mnemonic.to_string(), kind))
}

/// Maps a mnemonic to its instruction family.
fn classify(mnemonic: &str) -> Option<Family> {
    const WIDTHS: &[char] = &['b', 'h', 'w', 'd', 'q'];
    const FP_WIDTHS: &[char] = &['w', 'd', 'q'];
    const FP_FORMATS: &[char] = &['s', 'd', 'q'];

    let single = |s: &str, set: &[char]| {
        let mut chars = s.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if set.contains(&c))
    };

    if let Some(width) = mnemonic.strip_prefix("fl") {
        return single(width, FP_WIDTHS).then_some(Family::Load);
    }
    if let Some(width) = mnemonic.strip_prefix("fs") {
        if single(width, FP_WIDTHS) {
            return Some(Family::Store);
        }
    }
    match mnemonic {
        "li" | "liu" => return Some(Family::ImmediateLoad),
        "addi" | "addiw" | "addid" => return Some(Family::AluImmediate(AluOp::Add)),
        "beq" => return Some(Family::Branch(BranchCond::Equal)),
        "bne" => return Some(Family::Branch(BranchCond::NotEqual)),
        "blt" | "bltu" => return Some(Family::Branch(BranchCond::LessThan)),
        "bge" | "bgeu" => return Some(Family::Branch(BranchCond::GreaterOrEqual)),
        "j" => return Some(Family::Jump),
        _ => {}
    }
    if let Some(width) = mnemonic.strip_prefix('l') {
        let width = width.strip_suffix('u').unwrap_or(width);
        if single(width, WIDTHS) {
            return Some(Family::Load);
        }
    }
    if let Some(width) = mnemonic.strip_prefix('s') {
        if single(width, WIDTHS) {
            return Some(Family::Store);
        }
    }

    for (name, op) in [
        ("add", AluOp::Add),
        ("sub", AluOp::Sub),
        ("mul", AluOp::Mul),
        ("div", AluOp::Div),
    ] {
        if let Some(suffix) = mnemonic.strip_prefix(name) {
            if suffix.is_empty() || suffix == "w" || suffix == "d" {
                return Some(Family::Alu(op));
            }
        }
        if let Some(format) = mnemonic
            .strip_prefix('f')
            .and_then(|m| m.strip_prefix(name))
            .and_then(|m| m.strip_prefix('.'))
        {
            if single(format, FP_FORMATS) {
                return Some(Family::Alu(op));
            }
        }
    }
    None
}

/// Parses `offset(base)` or `base, offset` memory operands.
fn memory_operand(ops: &[&str]) -> Option<(String, i64)> {
    let first = ops.first()?;
    if let Some((offset, base)) = first.split_once('(') {
        let base = base.strip_suffix(')')?;
        return Some((register(base)?, immediate(offset)?));
    }
    Some((register(first)?, immediate(ops.get(1)?)?))
}

/// Accepts a register name: a word that is not a number.
fn register(token: &str) -> Option<String> {
    if immediate(token).is_some() {
        return None;
    }
    word(token)
}

/// Accepts an identifier made of letters, digits and underscores.
fn word(token: &str) -> Option<String> {
    let valid = !token.is_empty() && token.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then(|| token.to_string())
}

/// Parses a decimal integer literal.
fn immediate(token: &str) -> Option<i64> {
    token.parse().ok()
}
