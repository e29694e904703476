//! Named virtual registers.
//!
//! The simulator does not model a fixed architectural register file: every register
//! name that appears in the program becomes an entry, created while seeding. Each entry
//! is in exactly one of three states:
//! 1. **Empty:** Written by the program but never given a value yet.
//! 2. **Ready:** Holds a concrete value.
//! 3. **Pending:** Renamed to the reservation station that will produce its next value.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::common::value::format_value;
use crate::core::station::StationId;

/// Contents of one virtual register.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Register {
    /// No value and no producer.
    #[default]
    Empty,
    /// A concrete value.
    Ready(f64),
    /// Waiting on the result of a reservation station (the Qi tag).
    Pending(StationId),
}

impl Register {
    /// Returns the value if the register is ready.
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the producer tag if the register is pending.
    pub const fn producer(self) -> Option<StationId> {
        match self {
            Self::Pending(id) => Some(id),
            _ => None,
        }
    }

    /// Returns true if a reservation station will overwrite this register.
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// The set of named registers of one machine state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisterFile {
    regs: BTreeMap<String, Register>,
}

impl RegisterFile {
    /// Creates an empty register file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a register.
    pub fn insert(&mut self, name: impl Into<String>, reg: Register) {
        let _ = self.regs.insert(name.into(), reg);
    }

    /// Returns true if the register exists.
    pub fn contains(&self, name: &str) -> bool {
        self.regs.contains_key(name)
    }

    /// Returns the contents of a register.
    ///
    /// Unknown names read as [`Register::Empty`].
    pub fn get(&self, name: &str) -> Register {
        self.regs.get(name).copied().unwrap_or_default()
    }

    /// Overwrites a register with a concrete value.
    pub fn write(&mut self, name: &str, value: f64) {
        self.insert(name, Register::Ready(value));
    }

    /// Renames a register to the station that will produce its next value.
    pub fn wait_for(&mut self, name: &str, producer: StationId) {
        self.insert(name, Register::Pending(producer));
    }

    /// Delivers a broadcast result to every register waiting on `producer`.
    ///
    /// # Returns
    ///
    /// Names of the registers that were updated, in display order.
    pub fn resolve(&mut self, producer: StationId, value: f64) -> Vec<String> {
        let mut updated = Vec::new();
        for (name, reg) in &mut self.regs {
            if reg.producer() == Some(producer) {
                *reg = Register::Ready(value);
                updated.push(name.clone());
            }
        }
        updated.sort_by(|a, b| display_order(a, b));
        updated
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.regs.len()
    }

    /// Returns true if no register exists.
    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    /// Iterates registers in display order (`a2 a3 f0 f2 f4 f6 f8 f10 x1 ...`).
    pub fn iter(&self) -> impl Iterator<Item = (&str, Register)> {
        let mut entries: Vec<(&str, Register)> =
            self.regs.iter().map(|(name, reg)| (name.as_str(), *reg)).collect();
        entries.sort_by(|a, b| display_order(a.0, b.0));
        entries.into_iter()
    }
}

/// Orders register names by alphabetic prefix, then by numeric suffix.
///
/// Plain string order would put `f10` before `f2`.
pub fn display_order(a: &str, b: &str) -> Ordering {
    fn key(name: &str) -> (String, u64) {
        let letters: String = name.chars().filter(|c| !c.is_ascii_digit()).collect();
        let digits: String = name.chars().filter(char::is_ascii_digit).collect();
        (letters, digits.parse().unwrap_or(0))
    }
    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}

impl Serialize for RegisterFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.regs.len()))?;
        for (name, reg) in self.iter() {
            map.serialize_entry(name, &reg)?;
        }
        map.end()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("-"),
            Self::Ready(v) => f.write_str(&format_value(*v)),
            Self::Pending(id) => write!(f, "[{id}]"),
        }
    }
}
