//! Reservation stations and the station pool.
//!
//! The pool is a fixed array of named slots built from [`StationsConfig`]:
//! `Load1..N` (load/store buffers), `Add1..N` (adder) and `Mul1..N` (multiplier).
//! A [`StationId`] is the slot index and doubles as the producer tag (Qi/Qj/Qk) used
//! for register renaming; slot names only appear at the display boundary.
//!
//! Lifecycle of one slot:
//! 1. **Free:** `slot` is `None`.
//! 2. **Issued:** Operands captured or tagged, `step == delay`.
//! 3. **Executing:** The functional unit counts `step` down towards zero. Loads and
//!    stores spend their first step computing the effective address.
//! 4. **Result ready:** `step == 0`; the next broadcast (or memory commit for stores)
//!    frees the slot.

use std::fmt;

use serde::Serialize;

use crate::common::value::{format_optional, format_value};
use crate::config::StationsConfig;
use crate::core::register::Register;
use crate::isa::instruction::{AluOp, OpClass};

/// Index of a reservation station in the pool; also its producer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StationId(pub usize);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Functional-unit family a station belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationClass {
    /// Load/store buffer.
    LoadStore,
    /// Adder (add, subtract, immediate load).
    Add,
    /// Multiplier (multiply, divide).
    Mul,
}

impl StationClass {
    /// Prefix of the station names in this class.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::LoadStore => "Load",
            Self::Add => "Add",
            Self::Mul => "Mul",
        }
    }

    /// Returns true if a station of this class can hold an instruction of `class`.
    pub const fn accepts(self, class: OpClass) -> bool {
        matches!(
            (self, class),
            (Self::LoadStore, OpClass::Load | OpClass::Store)
                | (Self::Add, OpClass::Add | OpClass::Subtract)
                | (Self::Mul, OpClass::Multiply | OpClass::Divide)
        )
    }
}

/// Operation held by a busy station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationOp {
    /// Arithmetic on the Vj/Vk operands.
    Alu(AluOp),
    /// Memory read; Vj is the base address.
    Load,
    /// Memory write; Vj is the base address, Vk the value.
    Store,
}

/// One source operand of a station (the V/Q pair).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Operand {
    /// Unused, or read from a register that never received a value.
    #[default]
    Empty,
    /// Value available (V field).
    Ready(f64),
    /// Waiting on a producer (Q field).
    Waiting(StationId),
}

impl Operand {
    /// Captures a register at issue time: its value, or its producer tag.
    pub const fn from_register(reg: Register) -> Self {
        match reg {
            Register::Empty => Self::Empty,
            Register::Ready(v) => Self::Ready(v),
            Register::Pending(id) => Self::Waiting(id),
        }
    }

    /// Returns the value if available.
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if the value is available.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Resolves the operand if it waits on `producer`.
    ///
    /// Returns true if the operand changed.
    pub fn resolve(&mut self, producer: StationId, value: f64) -> bool {
        if *self == Self::Waiting(producer) {
            *self = Self::Ready(value);
            true
        } else {
            false
        }
    }
}

/// Address field (A) of a load/store station.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Address {
    /// Only the offset is known; the base register may still be pending.
    Offset {
        /// Base register name.
        base: String,
        /// Constant offset.
        offset: i64,
    },
    /// The effective address has been computed.
    Effective {
        /// `base_value + offset`.
        addr: i64,
        /// Base register name.
        base: String,
        /// Value of the base register when the address was computed.
        base_value: f64,
        /// Constant offset.
        offset: i64,
    },
}

impl Address {
    /// Returns the effective address once computed.
    pub const fn effective(&self) -> Option<i64> {
        match self {
            Self::Effective { addr, .. } => Some(*addr),
            Self::Offset { .. } => None,
        }
    }

    /// Symbolic form of the address: base register name and offset.
    pub fn symbolic(&self) -> (&str, i64) {
        match self {
            Self::Offset { base, offset } | Self::Effective { base, offset, .. } => {
                (base.as_str(), *offset)
            }
        }
    }

    /// Returns true if both addresses refer to the same location.
    ///
    /// Effective addresses are compared when both are known; otherwise the symbolic
    /// `(base, offset)` pairs are.
    pub fn aliases(&self, other: &Self) -> bool {
        match (self.effective(), other.effective()) {
            (Some(a), Some(b)) => a == b,
            _ => self.symbolic() == other.symbolic(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset { offset, .. } => write!(f, "{offset}"),
            Self::Effective {
                addr,
                base_value,
                offset,
                ..
            } => write!(f, "{addr} ({}+{offset})", format_value(*base_value)),
        }
    }
}

/// Runtime contents of a busy station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    /// Mnemonic of the held instruction.
    pub mnemonic: String,
    /// Code order of the held instruction.
    pub code_order: usize,
    /// Issue sequence number; orders in-flight instructions by program order.
    pub seq: usize,
    /// Operation performed.
    pub op: StationOp,
    /// First operand (Vj/Qj).
    pub j: Operand,
    /// Second operand (Vk/Qk).
    pub k: Operand,
    /// Address field, for loads and stores.
    pub address: Option<Address>,
    /// Functional-unit countdown, from `delay` to zero.
    pub step: u32,
    /// Result, once the functional unit has finished.
    pub result: Option<f64>,
}

impl Slot {
    /// Returns true if this slot holds a load.
    pub const fn is_load(&self) -> bool {
        matches!(self.op, StationOp::Load)
    }

    /// Returns true if this slot holds a store.
    pub const fn is_store(&self) -> bool {
        matches!(self.op, StationOp::Store)
    }
}

/// A reservation station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationStation {
    /// Display name (`Load1`, `Add2`, ...).
    pub name: String,
    /// Functional-unit family.
    pub class: StationClass,
    /// Cycles the functional unit needs per instruction.
    pub delay: u32,
    /// Set when the functional unit advanced during the last cycle.
    pub fu_busy: bool,
    /// Held instruction; `None` when the station is free.
    pub slot: Option<Slot>,
}

impl ReservationStation {
    /// Creates a free station.
    pub fn new(name: impl Into<String>, class: StationClass, delay: u32) -> Self {
        Self {
            name: name.into(),
            class,
            delay,
            fu_busy: false,
            slot: None,
        }
    }

    /// Returns true if an instruction occupies the station.
    pub const fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    /// Frees the station.
    pub fn reset(&mut self) {
        self.slot = None;
    }

    /// One-line summary in `Busy Op Vj Vk Qj Qk A` column order.
    pub fn summary(&self, names: &StationPool) -> String {
        let Some(slot) = &self.slot else {
            return "no\t-\t-\t-\t-\t-\t-".to_string();
        };
        let v = |op: Operand| format_optional(op.value());
        let q = |op: Operand| match op {
            Operand::Waiting(id) => names.name(id).to_string(),
            _ => "-".to_string(),
        };
        let address = slot
            .address
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        format!(
            "yes\t{}\t{}\t{}\t{}\t{}\t{address}",
            slot.mnemonic,
            v(slot.j),
            v(slot.k),
            q(slot.j),
            q(slot.k)
        )
    }
}

/// The fixed set of reservation stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StationPool {
    stations: Vec<ReservationStation>,
}

impl StationPool {
    /// Builds the pool described by the configuration, in `Load`, `Add`, `Mul` order.
    pub fn from_config(config: &StationsConfig) -> Self {
        let mut stations = Vec::new();
        for (class, pool) in config.classes() {
            for n in 1..=pool.count {
                stations.push(ReservationStation::new(
                    format!("{}{n}", class.prefix()),
                    class,
                    pool.delay,
                ));
            }
        }
        Self { stations }
    }

    /// Returns a station by id.
    ///
    /// Ids are only ever produced by this pool, so the index is always in range.
    pub fn get(&self, id: StationId) -> &ReservationStation {
        &self.stations[id.0]
    }

    /// Returns a station by id, mutably.
    pub fn get_mut(&mut self, id: StationId) -> &mut ReservationStation {
        &mut self.stations[id.0]
    }

    /// Display name of a station.
    pub fn name(&self, id: StationId) -> &str {
        self.stations.get(id.0).map_or("?", |rs| rs.name.as_str())
    }

    /// Iterates stations with their ids, in pool order.
    pub fn iter(&self) -> impl Iterator<Item = (StationId, &ReservationStation)> {
        self.stations
            .iter()
            .enumerate()
            .map(|(i, rs)| (StationId(i), rs))
    }

    /// Iterates busy stations with their slots, in pool order.
    pub fn busy(&self) -> impl Iterator<Item = (StationId, &ReservationStation, &Slot)> {
        self.iter()
            .filter_map(|(id, rs)| rs.slot.as_ref().map(|slot| (id, rs, slot)))
    }

    /// Iterates stations mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ReservationStation> {
        self.stations.iter_mut()
    }

    /// Finds the first free station able to hold an instruction of `class`.
    pub fn free_for(&self, class: OpClass) -> Option<StationId> {
        self.iter()
            .find(|(_, rs)| !rs.is_busy() && rs.class.accepts(class))
            .map(|(id, _)| id)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if the pool has no station.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Returns true if any station is busy.
    pub fn any_busy(&self) -> bool {
        self.stations.iter().any(ReservationStation::is_busy)
    }
}
