use std::sync::{Arc, Once};

use tomasim_core::isa::parse;
use tomasim_core::sim::seed::seed;
use tomasim_core::{Config, Simulation, State, simulate_source};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-friendly subscriber once per test binary.
///
/// Output is captured by the test runner; set `RUST_LOG=tomasim_core=trace` to see it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Runs `source` on the default machine.
pub fn run(source: &str) -> Simulation {
    run_with(source, &Config::default())
}

/// Runs `source` with a custom configuration.
pub fn run_with(source: &str, config: &Config) -> Simulation {
    init_tracing();
    simulate_source(source, config).expect("test program should simulate")
}

/// Builds the seeded initial state of `source` on the default machine.
pub fn initial_state(source: &str) -> State {
    init_tracing();
    let listing = Arc::new(parse(source).expect("test program should parse"));
    let (registers, memory) = seed(&listing);
    State::new(listing, registers, memory, &Config::default())
}

/// Builds the initial state of `source` and advances it `cycles` times.
pub fn state_after(source: &str, cycles: usize) -> State {
    let mut state = initial_state(source);
    for _ in 0..cycles {
        let _ = state.next_cycle();
    }
    state
}

/// Value a register holds in the initial state of a run.
pub fn initial_value(sim: &Simulation, register: &str) -> f64 {
    sim.states[0]
        .registers
        .get(register)
        .value()
        .unwrap_or_else(|| panic!("{register} has no initial value"))
}
