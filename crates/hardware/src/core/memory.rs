//! Sparse data memory.
//!
//! Only addresses the program touches exist. A cell holds `None` only after the driver
//! backfills addresses that other states know about, so that every snapshot of a run
//! exposes the same address set.

use std::collections::BTreeMap;

use serde::Serialize;

/// Address-to-value map of one machine state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Memory {
    cells: BTreeMap<i64, Option<f64>>,
}

impl Memory {
    /// Creates an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a cell.
    pub fn read(&self, addr: i64) -> Option<f64> {
        self.cells.get(&addr).copied().flatten()
    }

    /// Reads a cell, seeding it with `seed()` if it holds no value.
    pub fn read_or_seed(&mut self, addr: i64, seed: impl FnOnce() -> f64) -> f64 {
        let cell = self.cells.entry(addr).or_insert(None);
        *cell.get_or_insert_with(seed)
    }

    /// Writes a cell.
    pub fn write(&mut self, addr: i64, value: f64) {
        let _ = self.cells.insert(addr, Some(value));
    }

    /// Adds an empty cell for `addr` unless one exists.
    pub fn touch(&mut self, addr: i64) {
        let _ = self.cells.entry(addr).or_insert(None);
    }

    /// Returns true if the address exists, with or without a value.
    pub fn contains(&self, addr: i64) -> bool {
        self.cells.contains_key(&addr)
    }

    /// Iterates addresses in increasing order.
    pub fn addresses(&self) -> impl Iterator<Item = i64> + '_ {
        self.cells.keys().copied()
    }

    /// Iterates cells in address order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, Option<f64>)> + '_ {
        self.cells.iter().map(|(addr, value)| (*addr, *value))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no address exists.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
