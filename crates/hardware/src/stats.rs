//! Simulation statistics collection and reporting.
//!
//! This module tracks per-run counters for the Tomasulo machine. It provides:
//! 1. **Cycles and IPC:** Simulated cycles, issued instructions and derived metrics.
//! 2. **Stalls:** Cycles in which the fetch slot could not issue or resolve.
//! 3. **Write traffic:** Common data bus broadcasts and store commits.
//! 4. **Control flow:** Branches taken and not taken, jumps.
//!
//! Counters are accumulated by the driver from each cycle's [`CycleReport`].

use std::fmt;

use serde::Serialize;

use crate::core::state::{ControlOutcome, CycleReport};

/// Run statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Simulated cycles (states after the initial one).
    pub cycles: u64,
    /// Instructions placed into a reservation station.
    pub issued: u64,
    /// Cycles in which the next instruction stalled at issue.
    pub stalls: u64,
    /// Results published on the common data bus.
    pub broadcasts: u64,
    /// Stores that wrote memory.
    pub store_commits: u64,
    /// Conditional branches whose predicate held.
    pub branches_taken: u64,
    /// Conditional branches that fell through.
    pub branches_not_taken: u64,
    /// Unconditional jumps.
    pub jumps: u64,
    /// Whether the cycle cap cut the run short.
    pub truncated: bool,
}

impl SimStats {
    /// Accumulates one simulated cycle.
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.issued += u64::from(report.issued);
        self.stalls += u64::from(report.stalled);
        self.broadcasts += u64::from(report.broadcast);
        self.store_commits += report.stores_committed as u64;
        match report.control {
            Some(ControlOutcome::Taken) => self.branches_taken += 1,
            Some(ControlOutcome::NotTaken) => self.branches_not_taken += 1,
            Some(ControlOutcome::Jump) => self.jumps += 1,
            None => {}
        }
    }

    /// Instructions issued per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.issued as f64 / self.cycles as f64
        }
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cyc = self.cycles.max(1) as f64;
        writeln!(f, "==========================================================")?;
        writeln!(f, "TOMASULO SIMULATION STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "sim_cycles               {}", self.cycles)?;
        writeln!(f, "sim_issued               {}", self.issued)?;
        writeln!(f, "sim_ipc                  {:.4}", self.ipc())?;
        writeln!(f, "sim_truncated            {}", self.truncated)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(
            f,
            "  stalls.issue           {} ({:.2}%)",
            self.stalls,
            self.stalls as f64 / cyc * 100.0
        )?;
        writeln!(f, "  cdb.broadcasts         {}", self.broadcasts)?;
        writeln!(f, "  mem.store_commits      {}", self.store_commits)?;
        writeln!(f, "  branch.taken           {}", self.branches_taken)?;
        writeln!(f, "  branch.not_taken       {}", self.branches_not_taken)?;
        writeln!(f, "  jumps                  {}", self.jumps)?;
        write!(f, "==========================================================")
    }
}
