//! Simulation driver: clones and advances the machine until it goes quiet.
//!
//! Every cycle works on a fresh copy of the previous state, so the returned history is
//! a list of independent snapshots that renderers can index freely.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::common::SimError;
use crate::config::Config;
use crate::core::state::{Action, State, SubStep};
use crate::isa::asm::{Listing, parse};
use crate::sim::seed::seed;
use crate::stats::SimStats;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// A cycle made no progress, or none could; the history is complete.
    Finished,
    /// The cycle cap was reached while another cycle would still act; the history is
    /// truncated.
    CycleLimit,
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    /// The parsed program shared by every state.
    pub listing: Arc<Listing>,
    /// States by cycle; `states[0]` is the initial state.
    pub states: Vec<State>,
    /// Narrated sub-steps by cycle; `traces[0]` is empty.
    pub traces: Vec<Vec<SubStep>>,
    /// Run statistics.
    pub stats: SimStats,
    /// Whether the run finished or hit the cycle cap.
    pub completion: Completion,
}

impl Simulation {
    /// The state after the last simulated cycle.
    pub fn last_state(&self) -> Option<&State> {
        self.states.last()
    }

    /// Per-instruction action history: `timeline[code_order][cycle]`.
    pub fn timeline(&self) -> Vec<Vec<Option<Action>>> {
        (0..self.listing.len())
            .map(|order| {
                self.states
                    .iter()
                    .map(|state| state.actions.get(order).copied().flatten())
                    .collect()
            })
            .collect()
    }
}

/// Runs a parsed program.
///
/// # Arguments
///
/// * `listing` - The parsed program.
/// * `config` - Machine shape and cycle cap. Assumed valid (see [`Config::validate`]).
///
/// # Returns
///
/// The complete (or cap-truncated) history of the run.
pub fn simulate(listing: Arc<Listing>, config: &Config) -> Simulation {
    let (registers, memory) = seed(&listing);
    let initial = State::new(Arc::clone(&listing), registers, memory, config);
    drive(listing, initial, config)
}

/// Advances `initial` until a cycle makes no progress or the cap is reached.
///
/// The quiet cycle that ends a run is kept as the last state with an empty trace; it
/// does not count towards [`SimStats::cycles`].
fn drive(listing: Arc<Listing>, initial: State, config: &Config) -> Simulation {
    let mut states = vec![initial];
    let mut traces: Vec<Vec<SubStep>> = vec![Vec::new()];
    let mut stats = SimStats::default();
    let mut quiet = false;

    for _ in 0..config.general.max_cycles {
        let Some(last) = states.last() else {
            break;
        };
        let mut next = last.clone();
        let report = next.next_cycle();
        let progressed = report.progressed;
        if progressed {
            stats.record(&report);
        }
        traces.push(report.steps);
        states.push(next);
        if !progressed {
            quiet = true;
            break;
        }
    }

    // A run that used every cycle is only truncated if another cycle would still act.
    let completion = if quiet || !states.last().is_some_and(has_work) {
        Completion::Finished
    } else {
        Completion::CycleLimit
    };
    stats.truncated = completion == Completion::CycleLimit;

    backfill_memory(&mut states, &mut traces);
    info!(
        cycles = stats.cycles,
        issued = stats.issued,
        ?completion,
        "simulation complete"
    );

    Simulation {
        listing,
        states,
        traces,
        stats,
        completion,
    }
}

/// Returns true if advancing a copy of `state` would make progress.
fn has_work(state: &State) -> bool {
    state.clone().next_cycle().progressed
}

/// Parses and runs a program.
///
/// # Arguments
///
/// * `source` - Assembly text.
/// * `config` - Machine shape and cycle cap.
///
/// # Returns
///
/// The run, [`SimError::EmptyProgram`] when the text holds no instruction, or
/// [`SimError::Config`] when the configuration is invalid.
pub fn simulate_source(source: &str, config: &Config) -> Result<Simulation, SimError> {
    config.validate()?;
    let listing = parse(source).ok_or(SimError::EmptyProgram)?;
    Ok(simulate(Arc::new(listing), config))
}

/// Gives every snapshot of a run the same memory address set.
fn backfill_memory(states: &mut [State], traces: &mut [Vec<SubStep>]) {
    let mut addresses = BTreeSet::new();
    for state in states
        .iter()
        .chain(traces.iter().flatten().map(|step| &step.state))
    {
        addresses.extend(state.memory.addresses());
    }

    let all = states
        .iter_mut()
        .chain(traces.iter_mut().flatten().map(|step| &mut step.state));
    for state in all {
        for &addr in &addresses {
            state.memory.touch(addr);
        }
    }
}
