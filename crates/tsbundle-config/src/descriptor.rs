//! The resolved, immutable build descriptor handed to the bundling engine.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::experiments::ExperimentSet;
use crate::options::Mode;
use crate::rules::PreprocessRule;
use crate::source_map::SourceMapPolicy;
use crate::target::Target;
use crate::template::FilenameTemplate;

/// Fully resolved options for one build invocation.
///
/// Only the resolver constructs descriptors, and no method mutates one, so a
/// descriptor can be shared across threads without synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDescriptor {
    pub(crate) mode: Mode,
    pub(crate) target: Target,
    pub(crate) experiments: ExperimentSet,
    pub(crate) entry_path: PathBuf,
    pub(crate) output_directory: PathBuf,
    pub(crate) output_filename_pattern: FilenameTemplate,
    pub(crate) wasm_filename_pattern: FilenameTemplate,
    pub(crate) clean_before_build: bool,
    pub(crate) source_map_policy: SourceMapPolicy,
    pub(crate) preprocess_rules: Vec<PreprocessRule>,
}

impl BuildDescriptor {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn experiments(&self) -> &ExperimentSet {
        &self.experiments
    }

    /// Absolute path of the entry point
    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }

    /// Absolute path of the output directory
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn output_filename_pattern(&self) -> &FilenameTemplate {
        &self.output_filename_pattern
    }

    pub fn wasm_filename_pattern(&self) -> &FilenameTemplate {
        &self.wasm_filename_pattern
    }

    pub fn clean_before_build(&self) -> bool {
        self.clean_before_build
    }

    pub fn source_map_policy(&self) -> SourceMapPolicy {
        self.source_map_policy
    }

    pub fn preprocess_rules(&self) -> &[PreprocessRule] {
        &self.preprocess_rules
    }

    /// Render the descriptor in the bundling engine's configuration shape.
    ///
    /// JSON has no regex type, so each rule's `test` is emitted as regex
    /// source (`\.js$`). The engine reads a bare string as a path prefix;
    /// consumers must compile it, e.g. `new RegExp(rule.test)`, before handing
    /// the rules over.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tsbundle_config::{resolve, BuildOptions};
    ///
    /// let descriptor = resolve(&BuildOptions::default(), "/proj").unwrap();
    /// let config = descriptor.to_engine_config();
    /// assert_eq!(config["output"]["filename"], "[name].js");
    /// ```
    pub fn to_engine_config(&self) -> Value {
        let experiments: Map<String, Value> = self
            .experiments
            .iter()
            .map(|exp| (exp.as_str().to_string(), Value::Bool(true)))
            .collect();

        let rules: Vec<Value> = self
            .preprocess_rules
            .iter()
            .map(|rule| {
                json!({
                    "test": rule.test,
                    "enforce": rule.enforce,
                    "use": rule.transforms,
                })
            })
            .collect();

        json!({
            "mode": self.mode.as_str(),
            "target": self.target.as_str(),
            "experiments": experiments,
            "entry": self.entry_path.to_string_lossy(),
            "output": {
                "path": self.output_directory.to_string_lossy(),
                "filename": self.output_filename_pattern.as_str(),
                "webassemblyModuleFilename": self.wasm_filename_pattern.as_str(),
                "clean": self.clean_before_build,
            },
            "devtool": self.source_map_policy.devtool.as_engine_value(),
            "module": { "rules": rules },
        })
    }
}
