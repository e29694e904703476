//! WebAssembly entry points for the browser front end.
//!
//! The renderer lives in JavaScript; this crate only moves data across the boundary:
//! 1. **`simulate`:** Source text (and optional JSON configuration) in, the complete
//!    run serialized as JSON out.
//! 2. **`templates`:** The built-in example programs, as JSON.
//!
//! Errors surface as JavaScript `Error` objects. The JSON-producing functions are plain
//! Rust and are tested natively.

use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;

use tomasim_core::{Config, SimError, Template, simulate_source};

/// Failures of a binding call.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The configuration or program was rejected.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The result could not be serialized.
    #[error("failed to serialize the simulation: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<BindingError> for JsValue {
    fn from(err: BindingError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Runs a program and serializes the result.
///
/// # Arguments
///
/// * `source` - Assembly text.
/// * `config_json` - Optional configuration document; `None` uses the defaults.
///
/// # Returns
///
/// The `Simulation` as a JSON string.
pub fn simulate_json(source: &str, config_json: Option<&str>) -> Result<String, BindingError> {
    let config = match config_json {
        Some(json) if !json.trim().is_empty() => Config::from_json(json).map_err(SimError::from)?,
        _ => Config::default(),
    };
    let sim = simulate_source(source, &config)?;
    Ok(serde_json::to_string(&sim)?)
}

/// Name and source of a built-in program.
#[derive(Debug, Serialize)]
struct TemplateEntry {
    name: &'static str,
    source: &'static str,
}

/// Serializes the built-in programs as a JSON array of `{ name, source }`.
pub fn templates_json() -> Result<String, BindingError> {
    let entries: Vec<TemplateEntry> = Template::ALL
        .iter()
        .map(|t| TemplateEntry {
            name: t.name(),
            source: t.source(),
        })
        .collect();
    Ok(serde_json::to_string(&entries)?)
}

/// Runs a program; see [`simulate_json`].
#[wasm_bindgen]
pub fn simulate(source: &str, config_json: Option<String>) -> Result<String, JsValue> {
    Ok(simulate_json(source, config_json.as_deref())?)
}

/// Lists the built-in programs; see [`templates_json`].
#[wasm_bindgen]
pub fn templates() -> Result<String, JsValue> {
    Ok(templates_json()?)
}
