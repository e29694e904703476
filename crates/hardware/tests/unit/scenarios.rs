//! # Reference Program Tests
//!
//! Whole runs of small programs with known behaviour: a straight-line mix, a
//! write-after-write pair, empty input and a loop that never terminates on its own.

use pretty_assertions::assert_eq;
use tomasim_core::core::Action;
use tomasim_core::core::register::Register;
use tomasim_core::isa::parse;
use tomasim_core::{Completion, Config, SimError, Template, simulate_source};

use crate::common::harness::{initial_value, run, run_with};

const STRAIGHT_LINE: &str = "flw f6, 32(a2)\nflw f2, 44(a3)\nfmul.s f0, f2, f4\nfsub.s f8, f2, f6\nfdiv.s f0, f0, f6\nfadd.s f6, f6, f2";

#[test]
fn test_straight_line_program_issues_once_per_cycle() {
    let sim = run(STRAIGHT_LINE);
    assert_eq!(sim.listing.len(), 6);
    assert_eq!(sim.completion, Completion::Finished);
    assert!(sim.stats.cycles < 100);
    assert_eq!(sim.stats.issued, 6);
    assert_eq!(sim.stats.stalls, 0);
    assert_eq!(sim.stats.broadcasts, 6);

    let timeline = sim.timeline();
    for (order, row) in timeline.iter().enumerate() {
        assert_eq!(row[order + 1], Some(Action::Issue), "instruction {order}");
        assert_eq!(row.iter().filter(|a| **a == Some(Action::Issue)).count(), 1);
    }
}

#[test]
fn test_straight_line_program_ends_fully_resolved() {
    let sim = run(STRAIGHT_LINE);
    let last = sim.last_state().unwrap();
    assert!(last.is_idle());
    assert!(!last.stations.any_busy());
    for (name, reg) in last.registers.iter() {
        assert!(reg.value().is_some(), "{name} is {reg:?}");
    }

    let f2 = last.registers.get("f2").value().unwrap();
    let f6_loaded = sim.states[0]
        .memory
        .read((initial_value(&sim, "a2") + 32.0) as i64)
        .unwrap();
    assert_eq!(last.registers.get("f6"), Register::Ready(f6_loaded + f2));
}

#[test]
fn test_last_sub_step_matches_the_cycle_state() {
    let sim = run(STRAIGHT_LINE);
    assert_eq!(sim.states.len(), sim.traces.len());
    assert!(sim.traces[0].is_empty());
    // The run ends with one quiet cycle that narrates nothing.
    let quiet = sim.traces.len() - 1;
    assert!(sim.traces[quiet].is_empty());
    assert_eq!(sim.stats.cycles, quiet as u64 - 1);
    for (state, steps) in sim.states.iter().zip(&sim.traces).take(quiet).skip(1) {
        let last = steps.last().expect("a progressing cycle has steps");
        assert_eq!(&last.state, state);
        for step in steps {
            assert_eq!(step.state.cycle, state.cycle);
            assert!(step.narration.starts_with("**"));
        }
    }
}

#[test]
fn test_memory_addresses_are_backfilled() {
    let sim = run("sw x5, 0(a0)\nlw x6, 8(a1)");
    let expected: Vec<i64> = sim.last_state().unwrap().memory.addresses().collect();
    assert!(!expected.is_empty());
    for state in &sim.states {
        assert_eq!(state.memory.addresses().collect::<Vec<_>>(), expected);
    }
}

#[test]
fn test_waw_keeps_the_younger_result() {
    let sim = run(Template::Waw.source());
    let sum = initial_value(&sim, "f3") + initial_value(&sim, "f4");
    let product = initial_value(&sim, "f1") * initial_value(&sim, "f2");

    let written = sim
        .states
        .iter()
        .position(|s| s.actions[1] == Some(Action::Write))
        .expect("fadd.s writes back");
    for state in &sim.states[written..] {
        assert_eq!(state.registers.get("f6"), Register::Ready(sum));
    }
    assert!(sim.states.iter().all(|s| s.registers.get("f6") != Register::Ready(product)));
    assert!(sim.states.iter().any(|s| s.actions[0] == Some(Action::Write)));
}

#[test]
fn test_raw_consumer_waits_for_the_producer() {
    let sim = run(Template::Raw.source());
    let product = initial_value(&sim, "f1") * initial_value(&sim, "f2");
    let last = sim.last_state().unwrap();
    assert_eq!(
        last.registers.get("f5"),
        Register::Ready(initial_value(&sim, "f1") + product)
    );
}

#[test]
fn test_war_reader_keeps_the_old_value() {
    let sim = run(Template::War.source());
    let last = sim.last_state().unwrap();
    assert_eq!(
        last.registers.get("f4"),
        Register::Ready(initial_value(&sim, "f1") * initial_value(&sim, "f5"))
    );
}

#[test]
fn test_empty_input_is_not_simulated() {
    assert!(parse("").is_none());
    assert!(matches!(
        simulate_source("", &Config::default()),
        Err(SimError::EmptyProgram)
    ));
    assert!(matches!(
        simulate_source("loop:\n# x1 = 3\n", &Config::default()),
        Err(SimError::EmptyProgram)
    ));
}

#[test]
fn test_loop_runs_to_the_cycle_cap() {
    let sim = run(Template::Loop.source());
    assert_eq!(sim.completion, Completion::CycleLimit);
    assert_eq!(sim.states.len(), 101);
    assert!(sim.stats.truncated);
    assert!(sim.stats.branches_taken > 0);
    assert_eq!(sim.stats.branches_not_taken, 0);

    let last = sim.last_state().unwrap();
    let body_runs = last
        .program
        .execution_order()
        .iter()
        .filter(|&&order| order == 0)
        .count();
    assert!(body_runs > 1);

    for state in sim.states.iter().filter(|s| s.actions[1] == Some(Action::Branch)) {
        assert_eq!(state.program.next_instruction().map(|i| i.code_order), Some(0));
    }
}

#[test]
fn test_loop_exits_when_the_bound_is_reached() {
    let sim = run("# x1 = 0\n# x2 = 3\nloop:\naddi x1, x1, 1\nblt x1, x2, loop\nexit:\nadd x3, x1, x2");
    assert_eq!(sim.completion, Completion::Finished);
    assert_eq!(sim.stats.branches_taken, 2);
    assert_eq!(sim.stats.branches_not_taken, 1);
    let last = sim.last_state().unwrap();
    assert_eq!(last.registers.get("x1"), Register::Ready(3.0));
    assert_eq!(last.registers.get("x3"), Register::Ready(6.0));
}

#[test]
fn test_cdb_arbitration_prefers_the_older_instruction() {
    let mut config = Config::default();
    config.stations.add.delay = 4;
    let sim = run_with("fmul.s f1, f2, f3\nfadd.s f4, f2, f3", &config);

    let mul_write = sim
        .states
        .iter()
        .position(|s| s.actions[0] == Some(Action::Write))
        .unwrap();
    let add_write = sim
        .states
        .iter()
        .position(|s| s.actions[1] == Some(Action::Write))
        .unwrap();
    assert_eq!(mul_write, 7);
    assert_eq!(add_write, 8);
}

#[test]
fn test_every_template_runs() {
    for template in Template::ALL {
        let sim = run(template.source());
        let expected = if template == Template::Loop {
            Completion::CycleLimit
        } else {
            Completion::Finished
        };
        assert_eq!(sim.completion, expected, "{template}");
        assert!(serde_json::to_string(&sim).is_ok());
    }
}

#[test]
fn test_state_dump_names_stations_and_producers() {
    let sim = run(Template::Raw.source());
    let text = sim.states[2].to_string();
    assert!(text.starts_with("Cycle: 2\n"));
    assert!(text.contains("Reservation stations:"));
    assert!(text.contains("Mul1:\tyes\tfmul.s"));
    assert!(text.contains("f4 = [Mul1]"));
    assert!(text.contains("Memory:"));
}
