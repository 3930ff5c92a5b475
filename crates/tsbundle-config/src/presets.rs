//! Named option presets and JSON-level merging of override layers.
//!
//! Two built-in presets describe the Node + async WebAssembly build with and
//! without source map handling. Config files can declare more presets under
//! `[presets.<name>]`; a file preset shadows a built-in of the same name.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::error::{ConfigError, Result};
use crate::options::BuildOptions;

pub const NODE_WASM: &str = "node-wasm";
pub const NODE_WASM_LEAN: &str = "node-wasm-lean";

/// Options for a built-in preset, if `name` is one.
pub fn builtin(name: &str) -> Option<Value> {
    match name {
        NODE_WASM => Some(json!({
            "target": "node",
            "experiments": { "asyncWebAssembly": true },
            "source_map_policy": { "devtool": "source-map", "ingest_upstream": true },
        })),
        NODE_WASM_LEAN => Some(json!({
            "target": "node",
            "experiments": { "asyncWebAssembly": true },
            "source_map_policy": { "devtool": "none", "ingest_upstream": false },
        })),
        _ => None,
    }
}

pub fn builtin_names() -> [&'static str; 2] {
    [NODE_WASM, NODE_WASM_LEAN]
}

/// Apply preset `name` on top of `base`. File presets take precedence over
/// built-ins.
pub fn apply(
    base: BuildOptions,
    name: &str,
    file_presets: &BTreeMap<String, Value>,
) -> Result<BuildOptions> {
    let overrides = match file_presets.get(name) {
        Some(value) => value.clone(),
        None => builtin(name).ok_or_else(|| ConfigError::UnknownPreset {
            name: name.to_string(),
            available: available(file_presets),
        })?,
    };

    if overrides.is_null() {
        return Ok(base);
    }

    let mut merged = serde_json::to_value(&base).map_err(|e| preset_error(name, e))?;
    merge_values(&mut merged, &overrides);
    serde_json::from_value(merged).map_err(|e| preset_error(name, e))
}

fn available(file_presets: &BTreeMap<String, Value>) -> String {
    let mut names: Vec<&str> = file_presets.keys().map(String::as_str).collect();
    for builtin in builtin_names() {
        if !names.contains(&builtin) {
            names.push(builtin);
        }
    }
    names.join(", ")
}

fn preset_error(name: &str, err: serde_json::Error) -> ConfigError {
    ConfigError::invalid_value(format!("presets.{name}"), err.to_string())
}

/// Deep-merge `update` into `target`: objects merge key by key, everything
/// else (arrays included) is replaced.
pub(crate) fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}
