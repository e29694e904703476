//! Per-cycle Tomasulo scheduler.
//!
//! [`State::next_cycle`] advances a state by one clock cycle. Eligibility for every
//! phase is decided first, on the unmodified state, and only then applied. This keeps a
//! phase from enabling a later phase within the same cycle (a result computed this cycle
//! is broadcast next cycle, a station freed this cycle is reused next cycle).
//!
//! Phases, in application order:
//! 1. **Issue / Control:** The instruction under the fetch cursor enters a free
//!    compatible station, or a branch/jump resolves in the same slot.
//! 2. **Execute (arithmetic):** Stations with both operands ready count down.
//! 3. **Execute (address):** The oldest load/store with a ready base computes its
//!    effective address.
//! 4. **Execute (load):** Loads count down and finally read memory, unless an older
//!    store to the same address is pending.
//! 5. **Write (broadcast):** The oldest finished non-store station publishes its result
//!    on the common data bus and frees itself.
//! 6. **Write (store):** Stores with a ready value count down and finally write memory,
//!    unless an older load or store to the same address is pending.

use tracing::{debug, trace};

use crate::common::generator::instruction_value;
use crate::common::value::format_value;
use crate::core::hazards::{load_blocked, store_blocked};
use crate::core::register::Register;
use crate::core::state::{Action, ControlOutcome, CycleReport, State, SubStep};
use crate::core::station::{Address, Operand, Slot, StationId, StationOp};
use crate::isa::instruction::{AluOp, Instruction, InstructionKind, OpClass};

/// What the fetch slot does this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    /// Nothing left to fetch.
    Exhausted,
    /// No station free, or a branch operand is not available.
    Stall,
    /// Issue into the given station.
    Issue(StationId),
    /// Resolve a conditional branch.
    Branch {
        /// Whether the predicate holds.
        taken: bool,
    },
    /// Take an unconditional jump.
    Jump,
}

/// Phase eligibility computed from the pre-mutation state.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schedule {
    fetch: Fetch,
    alu: Vec<StationId>,
    address: Option<StationId>,
    load: Vec<StationId>,
    broadcast: Option<StationId>,
    commit: Vec<StationId>,
}

impl Schedule {
    /// Returns true if no phase has anything to do.
    fn is_idle(&self) -> bool {
        !matches!(
            self.fetch,
            Fetch::Issue(_) | Fetch::Branch { .. } | Fetch::Jump
        ) && self.alu.is_empty()
            && self.address.is_none()
            && self.load.is_empty()
            && self.broadcast.is_none()
            && self.commit.is_empty()
    }
}

impl State {
    /// Advances the machine by one clock cycle.
    ///
    /// Per-cycle action labels and functional-unit-busy flags are cleared first, so they
    /// describe this cycle only.
    ///
    /// # Returns
    ///
    /// The cycle report. `progressed` is false when no phase could act; the driver keeps
    /// this state as the last one and ends the run.
    pub fn next_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        self.actions.fill(None);
        for rs in self.stations.iter_mut() {
            rs.fu_busy = false;
        }

        let plan = self.schedule();
        let mut report = CycleReport {
            stalled: plan.fetch == Fetch::Stall,
            ..CycleReport::default()
        };
        if report.stalled {
            if let Some(inst) = self.program.next_instruction() {
                debug!(cycle = self.cycle, instruction = %inst, "issue stall");
            }
        }
        if plan.is_idle() {
            return report;
        }
        report.progressed = true;

        match plan.fetch {
            Fetch::Issue(id) => self.issue(id, &mut report),
            Fetch::Branch { taken } => self.resolve_branch(taken, &mut report),
            Fetch::Jump => self.resolve_jump(&mut report),
            Fetch::Stall | Fetch::Exhausted => {}
        }
        for id in plan.alu {
            self.execute_alu(id, &mut report);
        }
        if let Some(id) = plan.address {
            self.compute_address(id, &mut report);
        }
        for id in plan.load {
            self.execute_load(id, &mut report);
        }
        if let Some(id) = plan.broadcast {
            self.broadcast(id, &mut report);
        }
        for id in plan.commit {
            self.commit_store(id, &mut report);
        }
        report
    }

    /// Decides every phase's participants without modifying the state.
    fn schedule(&self) -> Schedule {
        let fetch = match self.program.next_instruction() {
            None => Fetch::Exhausted,
            Some(inst) => match &inst.kind {
                InstructionKind::Jump { .. } => Fetch::Jump,
                InstructionKind::Branch { cond, lhs, rhs, .. } => {
                    match (
                        self.registers.get(lhs).value(),
                        self.registers.get(rhs).value(),
                    ) {
                        (Some(a), Some(b)) => Fetch::Branch {
                            taken: cond.holds(a, b),
                        },
                        _ => Fetch::Stall,
                    }
                }
                _ => self
                    .stations
                    .free_for(inst.class())
                    .map_or(Fetch::Stall, Fetch::Issue),
            },
        };

        let mut alu = Vec::new();
        let mut load = Vec::new();
        let mut commit = Vec::new();
        let mut address: Option<(usize, StationId)> = None;
        let mut broadcast: Option<(usize, StationId)> = None;

        for (id, rs, slot) in self.stations.busy() {
            let fresh = slot.step == rs.delay;
            let started = slot.step < rs.delay;
            let computed = slot.address.as_ref().and_then(Address::effective).is_some();

            match slot.op {
                StationOp::Alu(_) => {
                    if slot.j.is_ready()
                        && slot.k.is_ready()
                        && slot.step > 0
                        && slot.step <= rs.delay
                    {
                        alu.push((slot.seq, id));
                    }
                }
                StationOp::Load | StationOp::Store => {
                    if fresh
                        && !computed
                        && slot.j.is_ready()
                        && address.is_none_or(|(seq, _)| slot.seq < seq)
                    {
                        address = Some((slot.seq, id));
                    }
                    if slot.is_load()
                        && computed
                        && started
                        && slot.result.is_none()
                        && !load_blocked(&self.stations, id)
                    {
                        load.push((slot.seq, id));
                    }
                    if slot.is_store()
                        && computed
                        && started
                        && slot.k.is_ready()
                        && !store_blocked(&self.stations, id)
                    {
                        commit.push((slot.seq, id));
                    }
                }
            }

            if !slot.is_store()
                && slot.step == 0
                && slot.result.is_some()
                && broadcast.is_none_or(|(seq, _)| slot.seq < seq)
            {
                broadcast = Some((slot.seq, id));
            }
        }

        Schedule {
            fetch,
            alu: by_program_order(alu),
            address: address.map(|(_, id)| id),
            load: by_program_order(load),
            broadcast: broadcast.map(|(_, id)| id),
            commit: by_program_order(commit),
        }
    }

    /// Places the instruction under the cursor into station `id` and renames its
    /// destination.
    fn issue(&mut self, id: StationId, report: &mut CycleReport) {
        let Some(inst) = self.program.next_instruction().cloned() else {
            return;
        };
        let Some((op, j, k, address)) = self.capture_operands(&inst) else {
            return;
        };
        let seq = self.program.fetched();
        let name = self.stations.name(id).to_string();

        let mut details = Vec::new();
        for reg in inst.src_registers() {
            details.push(match self.registers.get(reg) {
                Register::Ready(v) => format!("`{reg}` is ready with {}", format_value(v)),
                Register::Pending(p) => format!("`{reg}` waits on //{}//", self.stations.name(p)),
                Register::Empty => format!("`{reg}` has no value yet"),
            });
        }

        let rs = self.stations.get_mut(id);
        rs.slot = Some(Slot {
            mnemonic: inst.mnemonic.clone(),
            code_order: inst.code_order,
            seq,
            op,
            j,
            k,
            address,
            step: rs.delay,
            result: None,
        });
        for dest in inst.dest_registers() {
            self.registers.wait_for(dest, id);
            details.push(format!("`{dest}` now waits on //{name}//"));
        }
        self.set_action(inst.code_order, Action::Issue);
        self.program.advance(None);
        report.issued = true;

        debug!(cycle = self.cycle, station = %name, instruction = %inst, seq, "issue");
        let mut narration = format!(
            "**Issue**: `{inst}` (instruction {}) enters //{name}//.",
            inst.code_order
        );
        if !details.is_empty() {
            narration.push(' ');
            narration.push_str(&details.join("; "));
            narration.push('.');
        }
        self.snapshot(narration, report);
    }

    /// Reads the operands of an instruction as seen at issue time.
    ///
    /// Immediates bypass the register file. Returns `None` for branches and jumps,
    /// which never occupy a station.
    fn capture_operands(
        &self,
        inst: &Instruction,
    ) -> Option<(StationOp, Operand, Operand, Option<Address>)> {
        let reg = |name: &str| Operand::from_register(self.registers.get(name));
        let address = inst.memory_operand().map(|(base, offset)| Address::Offset {
            base: base.to_string(),
            offset,
        });
        let captured = match &inst.kind {
            InstructionKind::Load { base, .. } => {
                (StationOp::Load, reg(base), Operand::Empty, address)
            }
            InstructionKind::Store { src, base, .. } => {
                (StationOp::Store, reg(base), reg(src), address)
            }
            InstructionKind::ImmediateLoad { imm, .. } => (
                StationOp::Alu(AluOp::Add),
                Operand::Ready(*imm as f64),
                Operand::Ready(0.0),
                None,
            ),
            InstructionKind::Arithmetic { op, lhs, rhs, .. } => {
                (StationOp::Alu(*op), reg(lhs), reg(rhs), None)
            }
            InstructionKind::ImmediateArithmetic { op, lhs, imm, .. } => (
                StationOp::Alu(*op),
                reg(lhs),
                Operand::Ready(*imm as f64),
                None,
            ),
            InstructionKind::Branch { .. } | InstructionKind::Jump { .. } => return None,
        };
        Some(captured)
    }

    /// Resolves the branch under the cursor; the predicate was evaluated at scheduling.
    fn resolve_branch(&mut self, taken: bool, report: &mut CycleReport) {
        let Some(inst) = self.program.next_instruction().cloned() else {
            return;
        };
        let InstructionKind::Branch {
            cond,
            lhs,
            rhs,
            target,
        } = &inst.kind
        else {
            return;
        };
        let show = |name: &str| {
            self.registers
                .get(name)
                .value()
                .map_or_else(|| "-".to_string(), format_value)
        };
        let comparison = format!("{} {} {}", show(lhs), cond.symbol(), show(rhs));

        self.set_action(inst.code_order, Action::Branch);
        let narration = if taken {
            self.program.advance(Some(target.as_str()));
            report.control = Some(ControlOutcome::Taken);
            format!(
                "**Branch**: `{inst}` (instruction {}) compares {comparison}, which holds; fetch continues at //{target}//.",
                inst.code_order
            )
        } else {
            self.program.advance(None);
            report.control = Some(ControlOutcome::NotTaken);
            format!(
                "**Branch**: `{inst}` (instruction {}) compares {comparison}, which does not hold; fetch falls through.",
                inst.code_order
            )
        };
        debug!(cycle = self.cycle, instruction = %inst, taken, "branch resolved");
        self.snapshot(narration, report);
    }

    /// Takes the jump under the cursor.
    fn resolve_jump(&mut self, report: &mut CycleReport) {
        let Some(inst) = self.program.next_instruction().cloned() else {
            return;
        };
        let Some(target) = inst.target() else {
            return;
        };
        self.set_action(inst.code_order, Action::Jump);
        self.program.advance(Some(target));
        report.control = Some(ControlOutcome::Jump);

        debug!(cycle = self.cycle, instruction = %inst, target, "jump");
        let narration = format!(
            "**Jump**: `{inst}` (instruction {}) continues fetching at //{target}//.",
            inst.code_order
        );
        self.snapshot(narration, report);
    }

    /// Advances an arithmetic functional unit by one cycle.
    fn execute_alu(&mut self, id: StationId, report: &mut CycleReport) {
        let rs = self.stations.get_mut(id);
        let name = rs.name.clone();
        let Some(slot) = rs.slot.as_mut() else {
            return;
        };
        rs.fu_busy = true;
        slot.step -= 1;
        let code_order = slot.code_order;
        let narration = match (slot.op, slot.j.value(), slot.k.value()) {
            (StationOp::Alu(op), Some(a), Some(b)) if slot.step == 0 => {
                let result = op.apply(a, b);
                slot.result = Some(result);
                format!(
                    "**Execute**: //{name}// finishes instruction {code_order}: {} {} {} = {}.",
                    format_value(a),
                    op.symbol(),
                    format_value(b),
                    format_value(result)
                )
            }
            _ => format!(
                "**Execute**: //{name}// works on instruction {code_order}, {} cycle(s) left.",
                slot.step
            ),
        };
        trace!(cycle = self.cycle, station = %name, step = slot.step, "alu step");
        self.set_action(code_order, Action::Exec);
        self.snapshot(narration, report);
    }

    /// Computes the effective address of a load or store.
    fn compute_address(&mut self, id: StationId, report: &mut CycleReport) {
        let rs = self.stations.get_mut(id);
        let name = rs.name.clone();
        let Some(slot) = rs.slot.as_mut() else {
            return;
        };
        let (Some(base_value), Some(Address::Offset { base, offset })) =
            (slot.j.value(), slot.address.clone())
        else {
            return;
        };
        rs.fu_busy = true;
        let addr = (base_value + offset as f64) as i64;
        slot.address = Some(Address::Effective {
            addr,
            base,
            base_value,
            offset,
        });
        slot.step -= 1;
        let code_order = slot.code_order;
        let finished = slot.step == 0 && slot.is_load();

        trace!(cycle = self.cycle, station = %name, addr, "effective address");
        self.set_action(code_order, Action::Exec);
        let narration = format!(
            "**Execute**: //{name}// computes the effective address of instruction {code_order}: {} + {offset} = `{addr}`.",
            format_value(base_value)
        );
        // An aliasing older store holds the read back until it commits.
        if finished && !load_blocked(&self.stations, id) {
            let _ = self.finish_load(id, addr, code_order);
        }
        self.snapshot(narration, report);
    }

    /// Advances the memory access of a load.
    fn execute_load(&mut self, id: StationId, report: &mut CycleReport) {
        let rs = self.stations.get_mut(id);
        let name = rs.name.clone();
        let Some(slot) = rs.slot.as_mut() else {
            return;
        };
        let Some(addr) = slot.address.as_ref().and_then(Address::effective) else {
            return;
        };
        rs.fu_busy = true;
        slot.step = slot.step.saturating_sub(1);
        let step = slot.step;
        let code_order = slot.code_order;
        self.set_action(code_order, Action::Exec);

        let narration = if step == 0 {
            let value = self.finish_load(id, addr, code_order);
            format!(
                "**Execute**: //{name}// reads {} from address `{addr}` for instruction {code_order}.",
                format_value(value)
            )
        } else {
            format!(
                "**Execute**: //{name}// accesses memory for instruction {code_order}, {step} cycle(s) left."
            )
        };
        trace!(cycle = self.cycle, station = %name, step, "load step");
        self.snapshot(narration, report);
    }

    /// Reads memory for a finished load, seeding unknown cells.
    fn finish_load(&mut self, id: StationId, addr: i64, code_order: usize) -> f64 {
        let seed = self
            .program
            .at_code_order(code_order)
            .and_then(|inst| match &inst.kind {
                InstructionKind::Load { dest, .. } => {
                    Some(instruction_value(dest, &inst.mnemonic, OpClass::Load))
                }
                _ => None,
            })
            .unwrap_or(0.0);
        let value = self.memory.read_or_seed(addr, || seed);
        if let Some(slot) = self.stations.get_mut(id).slot.as_mut() {
            slot.result = Some(value);
        }
        value
    }

    /// Publishes a result on the common data bus and frees the station.
    fn broadcast(&mut self, id: StationId, report: &mut CycleReport) {
        let name = self.stations.name(id).to_string();
        let Some((value, code_order)) = self
            .stations
            .get(id)
            .slot
            .as_ref()
            .and_then(|slot| slot.result.map(|r| (r, slot.code_order)))
        else {
            return;
        };

        let registers = self.registers.resolve(id, value);
        let mut waiters = Vec::new();
        for rs in self.stations.iter_mut() {
            if let Some(slot) = rs.slot.as_mut() {
                let j = slot.j.resolve(id, value);
                let k = slot.k.resolve(id, value);
                if j || k {
                    waiters.push(format!("//{}//", rs.name));
                }
            }
        }
        self.stations.get_mut(id).reset();
        self.set_action(code_order, Action::Write);
        report.broadcast = true;

        debug!(cycle = self.cycle, station = %name, value, "cdb broadcast");
        let mut narration = format!(
            "**Write**: //{name}// broadcasts {} for instruction {code_order} on the CDB.",
            format_value(value)
        );
        if !registers.is_empty() {
            let names: Vec<String> = registers.iter().map(|r| format!("`{r}`")).collect();
            narration.push_str(&format!(" Registers updated: {}.", names.join(", ")));
        }
        if !waiters.is_empty() {
            narration.push_str(&format!(" Operands resolved in: {}.", waiters.join(", ")));
        }
        self.snapshot(narration, report);
    }

    /// Advances a store towards its memory commit.
    fn commit_store(&mut self, id: StationId, report: &mut CycleReport) {
        let rs = self.stations.get_mut(id);
        let name = rs.name.clone();
        let Some(slot) = rs.slot.as_mut() else {
            return;
        };
        let (Some(addr), Some(value)) = (
            slot.address.as_ref().and_then(Address::effective),
            slot.k.value(),
        ) else {
            return;
        };
        rs.fu_busy = true;
        slot.step = slot.step.saturating_sub(1);
        let step = slot.step;
        let code_order = slot.code_order;
        self.set_action(code_order, Action::Write);

        let narration = if step == 0 {
            self.memory.write(addr, value);
            self.stations.get_mut(id).reset();
            report.stores_committed += 1;
            debug!(cycle = self.cycle, station = %name, addr, value, "store commit");
            format!(
                "**Write**: //{name}// stores {} at address `{addr}` for instruction {code_order}.",
                format_value(value)
            )
        } else {
            trace!(cycle = self.cycle, station = %name, step, "store step");
            format!(
                "**Write**: //{name}// is writing memory for instruction {code_order}, {step} cycle(s) left."
            )
        };
        self.snapshot(narration, report);
    }

    /// Appends a narrated sub-step with a copy of the current state.
    fn snapshot(&self, narration: String, report: &mut CycleReport) {
        report.steps.push(SubStep {
            narration,
            state: self.clone(),
        });
    }
}

/// Sorts `(seq, id)` pairs by issue sequence and drops the keys.
fn by_program_order(mut entries: Vec<(usize, StationId)>) -> Vec<StationId> {
    entries.sort_unstable();
    entries.into_iter().map(|(_, id)| id).collect()
}
