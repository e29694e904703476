//! Deterministic example values.
//!
//! Registers and memory cells that a program reads before writing need plausible
//! values so the simulation can run without user-supplied state. The values are pure
//! functions of a name (register name, usually), so the same source text always
//! produces the same run.

use crate::isa::instruction::OpClass;

/// Folds the UTF-16 code units of `seed` into a 32-bit accumulator.
///
/// The first unit seeds the accumulator; every later unit is shifted left by 17 bits
/// and XOR-ed in, with two's complement wrap-around. The empty string maps to 0.
pub fn number_from_string(seed: &str) -> i32 {
    let mut units = seed.encode_utf16();
    let Some(first) = units.next() else {
        return 0;
    };
    units.fold(i32::from(first), |acc, unit| acc ^ (i32::from(unit) << 17))
}

/// Small non-negative integer derived from `seed` (below 999).
pub fn deterministic_int(seed: &str) -> f64 {
    f64::from(number_from_string(seed).max(1) % 999)
}

/// Small rational with one decimal digit derived from `seed` (`n1.n2`, `n1 < 99`).
pub fn deterministic_float(seed: &str) -> f64 {
    let n = number_from_string(seed);
    let square = f64::from(n) * f64::from(n);
    let digits = format!("{square:0>4}");
    let n2: i32 = digits.get(1..3).and_then(|s| s.parse().ok()).unwrap_or(0);
    let n1 = n.max(1) % 99;
    let n2 = n2.max(1) % 9;
    format!("{n1}.{n2}").parse().unwrap_or(f64::from(n1))
}

/// Example value for a register or memory cell touched by an instruction.
///
/// # Arguments
///
/// * `register` - Name the value is derived from.
/// * `mnemonic` - Mnemonic of the instruction touching the location.
/// * `class` - Operation class of that instruction.
///
/// # Returns
///
/// A float when the mnemonic is a floating-point one (`f...`) and either the instruction
/// is not a load/store or the register itself is a floating-point register; an integer
/// otherwise. Integer address registers of `flw`/`fsw` thus stay integral.
pub fn instruction_value(register: &str, mnemonic: &str, class: OpClass) -> f64 {
    if mnemonic.starts_with('f') && (!class.is_memory() || register.starts_with('f')) {
        deterministic_float(register)
    } else {
        deterministic_int(register)
    }
}
