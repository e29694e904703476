//! # Randomized Invariants
//!
//! Straight-line programs over a handful of registers are generated and run to
//! completion; every state of every run must satisfy the machine's invariants, and
//! the final registers and memory must match in-order execution on any machine shape.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tomasim_core::core::register::Register;
use tomasim_core::core::station::Operand;
use tomasim_core::core::{Action, State};
use tomasim_core::isa::{InstructionKind, parse};
use tomasim_core::config::PoolConfig;
use tomasim_core::{Completion, Config, Simulation};

use crate::common::harness::{run, run_with};

/// One source line over `x1..x4`, with `a0`/`a1` as never-written base registers.
fn instruction() -> impl Strategy<Value = String> {
    let reg = prop::sample::select(vec!["x1", "x2", "x3", "x4"]);
    let base = prop::sample::select(vec!["a0", "a1"]);
    let op = prop::sample::select(vec!["add", "sub", "mul"]);
    prop_oneof![
        (op, reg.clone(), reg.clone(), reg.clone())
            .prop_map(|(op, d, l, r)| format!("{op} {d}, {l}, {r}")),
        (reg.clone(), -8i64..8).prop_map(|(d, imm)| format!("addi {d}, {d}, {imm}")),
        (reg.clone(), 0i64..16).prop_map(|(d, imm)| format!("li {d}, {imm}")),
        (reg.clone(), base.clone(), 0i64..4)
            .prop_map(|(d, b, o)| format!("lw {d}, {}({b})", o * 4)),
        (reg, base, 0i64..4).prop_map(|(s, b, o)| format!("sw {s}, {}({b})", o * 4)),
    ]
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(instruction(), 1..7).prop_map(|lines| lines.join("\n"))
}

fn pool(max_delay: u32) -> impl Strategy<Value = PoolConfig> {
    (1usize..=3, 1..=max_delay).prop_map(|(count, delay)| PoolConfig { count, delay })
}

/// Any machine shape with at least one station per class and nonzero delays.
fn machine() -> impl Strategy<Value = Config> {
    (pool(4), pool(4), pool(6)).prop_map(|(load, add, mul)| {
        let mut config = Config::default();
        config.general.max_cycles = 1000;
        config.stations.load = load;
        config.stations.add = add;
        config.stations.mul = mul;
        config
    })
}

/// Final registers and memory of executing the run's program one instruction at a
/// time, starting from its initial state.
fn in_order(sim: &Simulation) -> (BTreeMap<String, f64>, BTreeMap<i64, f64>) {
    let initial = &sim.states[0];
    let mut regs: BTreeMap<String, f64> = initial
        .registers
        .iter()
        .filter_map(|(name, reg)| reg.value().map(|v| (name.to_string(), v)))
        .collect();
    let mut mem: BTreeMap<i64, f64> = initial
        .memory
        .iter()
        .filter_map(|(addr, value)| value.map(|v| (addr, v)))
        .collect();

    for inst in &sim.listing.instructions {
        let read = |regs: &BTreeMap<String, f64>, name: &str| -> f64 {
            *regs.get(name).unwrap_or_else(|| panic!("{name} read before written"))
        };
        let addr = |regs: &BTreeMap<String, f64>, base: &str, offset: i64| {
            (read(regs, base) + offset as f64) as i64
        };
        match &inst.kind {
            InstructionKind::Load { dest, base, offset } => {
                let value = mem[&addr(&regs, base, *offset)];
                let _ = regs.insert(dest.clone(), value);
            }
            InstructionKind::Store { src, base, offset } => {
                let value = read(&regs, src);
                let _ = mem.insert(addr(&regs, base, *offset), value);
            }
            InstructionKind::ImmediateLoad { dest, imm } => {
                let _ = regs.insert(dest.clone(), *imm as f64 + 0.0);
            }
            InstructionKind::Arithmetic { op, dest, lhs, rhs } => {
                let value = op.apply(read(&regs, lhs), read(&regs, rhs));
                let _ = regs.insert(dest.clone(), value);
            }
            InstructionKind::ImmediateArithmetic { op, dest, lhs, imm } => {
                let value = op.apply(read(&regs, lhs), *imm as f64);
                let _ = regs.insert(dest.clone(), value);
            }
            InstructionKind::Branch { .. } | InstructionKind::Jump { .. } => {
                unreachable!("generated programs are straight-line")
            }
        }
    }
    (regs, mem)
}

/// Every state of the run, sub-step snapshots included.
fn all_states(sim: &Simulation) -> impl Iterator<Item = &State> {
    sim.states
        .iter()
        .chain(sim.traces.iter().flatten().map(|step| &step.state))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn runs_are_deterministic(source in program()) {
        let a = run(&source);
        let b = run(&source);
        prop_assert_eq!(&a.states, &b.states);
        prop_assert_eq!(&a.traces, &b.traces);
        prop_assert_eq!(&a.stats, &b.stats);
    }

    #[test]
    fn straight_line_programs_finish(source in program()) {
        let sim = run(&source);
        let len = sim.listing.len();
        prop_assert_eq!(sim.completion, Completion::Finished);
        prop_assert!(sim.last_state().unwrap().is_idle());
        prop_assert_eq!(sim.stats.issued, len as u64);
    }

    #[test]
    fn producer_tags_name_busy_stations(source in program()) {
        let sim = run(&source);
        for state in all_states(&sim) {
            for (name, reg) in state.registers.iter() {
                if let Register::Pending(id) = reg {
                    prop_assert!(
                        state.stations.get(id).is_busy(),
                        "{} waits on a free station",
                        name
                    );
                }
            }
            for (_, _, slot) in state.stations.busy() {
                for operand in [slot.j, slot.k] {
                    if let Operand::Waiting(id) = operand {
                        prop_assert!(state.stations.get(id).is_busy());
                    }
                }
            }
        }
    }

    #[test]
    fn at_most_one_broadcast_per_cycle(source in program()) {
        let sim = run(&source);
        let listing = parse(&source).unwrap();
        for state in &sim.states {
            let writers = state
                .actions
                .iter()
                .zip(&listing.instructions)
                .filter(|(action, inst)| {
                    **action == Some(Action::Write)
                        && !matches!(inst.kind, InstructionKind::Store { .. })
                })
                .count();
            prop_assert!(writers <= 1, "cycle {} has {} writers", state.cycle, writers);
        }
        prop_assert!(sim.stats.broadcasts <= sim.stats.cycles);
    }

    #[test]
    fn fetch_is_monotonic(source in program()) {
        let sim = run(&source);
        for pair in sim.states.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            prop_assert!(after.program.fetched() >= before.program.fetched());
            prop_assert!(after.program.fetched() - before.program.fetched() <= 1);
            prop_assert!(after
                .program
                .execution_order()
                .starts_with(before.program.execution_order()));
        }
    }

    #[test]
    fn results_match_in_order_execution(source in program(), config in machine()) {
        let sim = run_with(&source, &config);
        prop_assert_eq!(sim.completion, Completion::Finished);
        let (regs, mem) = in_order(&sim);
        let last = sim.last_state().unwrap();
        for (name, value) in &regs {
            prop_assert_eq!(last.registers.get(name), Register::Ready(*value), "{}", name);
        }
        for (addr, value) in &mem {
            prop_assert_eq!(last.memory.read(*addr), Some(*value), "address {}", addr);
        }
    }
}
