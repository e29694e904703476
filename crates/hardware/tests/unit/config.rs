//! # Configuration Tests
//!
//! Defaults, partial JSON documents and validation failures.

use pretty_assertions::assert_eq;
use tomasim_core::config::{Config, PoolConfig};
use tomasim_core::{ConfigError, SimError, simulate_source};

use crate::common::harness::run_with;

#[test]
fn test_default_machine() {
    let config = Config::default();
    assert_eq!(config.general.max_cycles, 100);
    assert_eq!(config.program.queue_window, None);
    assert_eq!(config.stations.load, PoolConfig { count: 3, delay: 3 });
    assert_eq!(config.stations.add, PoolConfig { count: 3, delay: 2 });
    assert_eq!(config.stations.mul, PoolConfig { count: 2, delay: 5 });
}

#[test]
fn test_empty_document_is_the_default() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
}

#[test]
fn test_partial_document_keeps_other_defaults() {
    let config = Config::from_json(
        r#"{ "general": { "max_cycles": 40 }, "stations": { "mul": { "count": 1, "delay": 10 } } }"#,
    )
    .unwrap();
    assert_eq!(config.general.max_cycles, 40);
    assert_eq!(config.stations.mul, PoolConfig { count: 1, delay: 10 });
    assert_eq!(config.stations.add, Config::default().stations.add);
}

#[test]
fn test_validation_failures() {
    assert!(matches!(
        Config::from_json("{ nope"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        Config::from_json(r#"{ "general": { "max_cycles": 0 } }"#),
        Err(ConfigError::ZeroCycleLimit)
    ));
    assert!(matches!(
        Config::from_json(r#"{ "stations": { "add": { "count": 2, "delay": 0 } } }"#),
        Err(ConfigError::ZeroDelay { name: "Add" })
    ));
    let empty = r#"{ "stations": {
        "load": { "count": 0, "delay": 1 },
        "add":  { "count": 0, "delay": 1 },
        "mul":  { "count": 0, "delay": 1 } } }"#;
    assert!(matches!(Config::from_json(empty), Err(ConfigError::EmptyPool)));
}

#[test]
fn test_unused_class_may_have_zero_delay() {
    let config = Config::from_json(r#"{ "stations": { "mul": { "count": 0, "delay": 0 } } }"#);
    assert!(config.is_ok());
}

#[test]
fn test_station_names_follow_the_pool_shape() {
    let config =
        Config::from_json(r#"{ "stations": { "load": { "count": 1, "delay": 2 } } }"#).unwrap();
    let sim = run_with("add x1, x2, x3", &config);
    let names: Vec<&str> = sim.states[0]
        .stations
        .iter()
        .map(|(_, rs)| rs.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Load1", "Add1", "Add2", "Add3", "Mul1", "Mul2"]
    );
}

#[test]
fn test_invalid_config_is_rejected_by_the_driver() {
    let mut config = Config::default();
    config.stations.add.delay = 0;
    let err = simulate_source("add x1, x2, x3", &config);
    assert!(matches!(
        err,
        Err(SimError::Config(ConfigError::ZeroDelay { .. }))
    ));
}

#[test]
fn test_cycle_cap_is_honoured() {
    let mut config = Config::default();
    config.general.max_cycles = 3;
    let sim = run_with("fdiv.s f1, f2, f3", &config);
    assert_eq!(sim.states.len(), 4);
    assert!(sim.stats.truncated);
}
