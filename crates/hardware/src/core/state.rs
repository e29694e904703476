//! Machine state snapshots.
//!
//! A [`State`] is everything one clock cycle of the machine consists of: fetch cursor,
//! registers, reservation stations, memory, and the action each instruction performed
//! during the cycle that produced it. States are plain values; the driver produces the
//! next one by cloning the previous one and running [`State::next_cycle`] on the copy.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::common::value::format_optional;
use crate::config::Config;
use crate::core::memory::Memory;
use crate::core::program::Program;
use crate::core::register::RegisterFile;
use crate::core::station::StationPool;
use crate::isa::asm::Listing;

/// What an instruction did during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    /// Placed into a reservation station.
    Issue,
    /// Advanced its functional unit.
    Exec,
    /// Broadcast its result, or committed a store.
    Write,
    /// Conditional branch resolved.
    Branch,
    /// Unconditional jump taken.
    Jump,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Issue => "Issue",
            Self::Exec => "Exec",
            Self::Write => "Write",
            Self::Branch => "Branch",
            Self::Jump => "Jump",
        };
        f.write_str(label)
    }
}

/// One snapshot of the machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    /// Clock cycle this state represents; the initial state is cycle 0.
    pub cycle: u64,
    /// Fetch cursor.
    pub program: Program,
    /// Virtual registers.
    pub registers: RegisterFile,
    /// Reservation stations.
    pub stations: StationPool,
    /// Data memory.
    pub memory: Memory,
    /// Last action of each instruction during this cycle, indexed by code order.
    pub actions: Vec<Option<Action>>,
}

impl State {
    /// Builds the initial state of a run.
    ///
    /// # Arguments
    ///
    /// * `listing` - Parsed program, shared by every state of the run.
    /// * `registers` - Seeded register file.
    /// * `memory` - Seeded memory.
    /// * `config` - Station pool shape and queue window.
    pub fn new(
        listing: Arc<Listing>,
        registers: RegisterFile,
        memory: Memory,
        config: &Config,
    ) -> Self {
        let actions = vec![None; listing.len()];
        Self {
            cycle: 0,
            program: Program::new(listing, config.program.queue_window),
            registers,
            stations: StationPool::from_config(&config.stations),
            memory,
            actions,
        }
    }

    /// Returns true when nothing is left to do: fetching is exhausted and every station
    /// is free.
    pub fn is_idle(&self) -> bool {
        self.program.is_exhausted() && !self.stations.any_busy()
    }

    /// Records the action of an instruction for this cycle.
    pub(crate) fn set_action(&mut self, code_order: usize, action: Action) {
        if let Some(slot) = self.actions.get_mut(code_order) {
            *slot = Some(action);
        }
    }
}

/// A narrated step within one cycle, with the machine state right after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubStep {
    /// Human-readable description using `**bold**`, `//italic//` and `` `code` ``
    /// markup.
    pub narration: String,
    /// Snapshot after the step.
    pub state: State,
}

/// Outcome of the control-flow instruction resolved in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlOutcome {
    /// Branch predicate held; fetch redirected.
    Taken,
    /// Branch predicate failed; fetch fell through.
    NotTaken,
    /// Unconditional jump.
    Jump,
}

/// Everything that happened during one call to [`State::next_cycle`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CycleReport {
    /// Whether any phase changed the machine.
    pub progressed: bool,
    /// Narrated sub-steps, in phase order.
    pub steps: Vec<SubStep>,
    /// An instruction entered a reservation station.
    pub issued: bool,
    /// The next instruction could not issue or resolve.
    pub stalled: bool,
    /// A result was broadcast on the common data bus.
    pub broadcast: bool,
    /// Number of stores that wrote memory.
    pub stores_committed: usize,
    /// Resolution of a branch or jump, if one happened.
    pub control: Option<ControlOutcome>,
}

impl fmt::Display for State {
    /// Plain-text dump: cycle, instruction queue, registers, stations and memory.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cycle: {}", self.cycle)?;

        writeln!(f, "Instruction queue:")?;
        let queue = self.program.instruction_queue();
        for order in queue.visible.iter().chain(&queue.remaining) {
            if let Some(inst) = self.program.at_code_order(*order) {
                writeln!(f, "    {order}: {inst}")?;
            }
        }

        writeln!(f, "Registers:")?;
        for (name, reg) in self.registers.iter() {
            match reg.producer() {
                Some(id) => writeln!(f, "    {name} = [{}]", self.stations.name(id))?,
                None => writeln!(f, "    {name} = {reg}")?,
            }
        }

        writeln!(f, "Reservation stations:")?;
        writeln!(f, "         \tBusy\tOp\tVj\tVk\tQj\tQk\tA")?;
        for (_, rs) in self.stations.iter() {
            writeln!(f, "    {}:\t{}", rs.name, rs.summary(&self.stations))?;
        }

        writeln!(f, "Memory:")?;
        for (addr, value) in self.memory.iter() {
            writeln!(f, "    {addr} = {}", format_optional(value))?;
        }
        Ok(())
    }
}
