//! # State Copy Tests
//!
//! The driver builds each cycle on a copy of the previous state; copies must be equal
//! when taken and independent afterwards.

use pretty_assertions::assert_eq;

use crate::common::harness::{run, state_after};

const PROGRAM: &str = "flw f6, 32(a2)\nfmul.s f0, f6, f4\nfsw f0, 0(a3)";

#[test]
fn test_clone_is_equal() {
    let state = state_after(PROGRAM, 3);
    assert_eq!(state.clone(), state);
}

#[test]
fn test_advancing_a_copy_leaves_the_original_untouched() {
    let original = state_after(PROGRAM, 2);
    let before = original.clone();

    let mut copy = original.clone();
    for _ in 0..5 {
        let _ = copy.next_cycle();
    }
    assert_ne!(copy, original);
    assert_eq!(original, before);
    assert_eq!(original.cycle, 2);
    assert_eq!(copy.cycle, 7);
}

#[test]
fn test_history_states_are_independent_snapshots() {
    let sim = run(PROGRAM);
    for (i, state) in sim.states.iter().enumerate() {
        assert_eq!(state.cycle, i as u64);
    }
    assert!(sim.states[0].program.execution_order().is_empty());
    assert_eq!(sim.last_state().unwrap().program.execution_order(), &[0, 1, 2]);
    assert!(!sim.states[0].stations.any_busy());
}

#[test]
fn test_rerunning_a_prefix_reproduces_the_history() {
    let sim = run(PROGRAM);
    let replayed = state_after(PROGRAM, 4);
    let mut recorded = sim.states[4].clone();
    // Memory of recorded states is backfilled with every address the run touches.
    for addr in replayed.memory.addresses() {
        assert!(recorded.memory.contains(addr));
    }
    recorded.memory = replayed.memory.clone();
    assert_eq!(recorded, replayed);
}
