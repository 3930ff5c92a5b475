//! Tests for the engine-facing rendering of a descriptor.

use serde_json::json;
use tsbundle_config::{BuildOptions, Resolver, SchemaValidator, SourceMapPolicy, Target};

fn resolve(options: &BuildOptions) -> tsbundle_config::BuildDescriptor {
    Resolver::with_validator(SchemaValidator)
        .resolve(options, "/proj")
        .expect("resolve")
}

#[test]
fn node_wasm_build_matches_engine_shape() {
    let options = BuildOptions::new()
        .with_target(Target::Node)
        .with_entry("./src/index.ts")
        .with_experiment("asyncWebAssembly", true);

    assert_eq!(
        resolve(&options).to_engine_config(),
        json!({
            "mode": "production",
            "target": "node",
            "experiments": { "asyncWebAssembly": true },
            "entry": "/proj/src/index.ts",
            "output": {
                "path": "/proj/dist",
                "filename": "[name].js",
                "webassemblyModuleFilename": "[id].wasm",
                "clean": true
            },
            "devtool": "source-map",
            "module": {
                "rules": [
                    { "test": "\\.js$", "enforce": "pre", "use": ["source-map-loader"] }
                ]
            }
        })
    );
}

#[test]
fn disabled_source_maps_render_false() {
    let options = BuildOptions {
        source_map_policy: Some(SourceMapPolicy::DISABLED),
        ..BuildOptions::default()
    };
    let config = resolve(&options).to_engine_config();
    assert_eq!(config["devtool"], json!(false));
    assert_eq!(config["module"]["rules"], json!([]));
    assert_eq!(config["experiments"], json!({}));
}

#[test]
fn descriptor_serializes_camel_case() {
    let value = serde_json::to_value(resolve(&BuildOptions::default())).expect("serialize");
    assert_eq!(value["entryPath"], json!("/proj/src/index.ts"));
    assert_eq!(value["outputDirectory"], json!("/proj/dist"));
    assert_eq!(value["cleanBeforeBuild"], json!(true));
    assert_eq!(value["wasmFilenamePattern"], json!("[id].wasm"));
    assert_eq!(value["experiments"], json!([]));
}

#[test]
fn rule_tests_are_regex_source() {
    let config = resolve(&BuildOptions::default()).to_engine_config();
    let source = config["module"]["rules"][0]["test"]
        .as_str()
        .expect("rule test is a string");
    let pattern = regex::Regex::new(source).expect("rule test compiles as a regex");

    assert!(pattern.is_match("/proj/node_modules/wasm-pkg/index.js"));
    assert!(!pattern.is_match("/proj/src/index.ts"));
    assert!(!"/proj/node_modules/wasm-pkg/index.js".starts_with(source));
}
