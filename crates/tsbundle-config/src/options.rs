//! Partial build options, as written in config files or built in code.

use std::path::PathBuf;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::rules::PreprocessRule;
use crate::source_map::SourceMapPolicy;
use crate::target::Target;

/// Optimization policy applied downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Build options with every field optional. Omitted fields take the
/// resolver's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BuildOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,

    /// Experiment name → enabled, e.g. `asyncWebAssembly = true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiments: Option<IndexMap<String, bool>>,

    /// Entry point, relative to the project root or absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_filename_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wasm_filename_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_before_build: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map_policy: Option<SourceMapPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocess_rules: Option<Vec<PreprocessRule>>,

    /// Root of the source tree protected from cleaning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<PathBuf>,

    /// Directories below the project root that may be cleaned, in addition
    /// to `dist`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_ignorable_directories: Option<Vec<PathBuf>>,

    /// Acknowledge cleaning an output directory that overlaps the source tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unsafe_clean: Option<bool>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use tsbundle_config::{BuildOptions, Mode};
    /// use serde_json::json;
    ///
    /// let options = BuildOptions::from_value(json!({
    ///     "mode": "development",
    ///     "entry_path": "./src/main.ts"
    /// }))
    /// .unwrap();
    /// assert_eq!(options.mode, Some(Mode::Development));
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::invalid_value("options", e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::invalid_value("options", e.to_string()))
    }

    /// Layer `overrides` on top of `self`. Fields set in `overrides` win,
    /// experiment maps merge key by key, rule lists are replaced wholesale.
    pub fn merge(&mut self, overrides: BuildOptions) {
        let BuildOptions {
            mode,
            target,
            experiments,
            entry_path,
            output_directory,
            output_filename_pattern,
            wasm_filename_pattern,
            clean_before_build,
            source_map_policy,
            preprocess_rules,
            source_directory,
            clean_ignorable_directories,
            allow_unsafe_clean,
        } = overrides;

        if let Some(flags) = experiments {
            self.experiments.get_or_insert_with(IndexMap::new).extend(flags);
        }

        self.mode = mode.or(self.mode);
        self.target = target.or(self.target);
        self.entry_path = entry_path.or(self.entry_path.take());
        self.output_directory = output_directory.or(self.output_directory.take());
        self.output_filename_pattern =
            output_filename_pattern.or(self.output_filename_pattern.take());
        self.wasm_filename_pattern = wasm_filename_pattern.or(self.wasm_filename_pattern.take());
        self.clean_before_build = clean_before_build.or(self.clean_before_build);
        self.source_map_policy = source_map_policy.or(self.source_map_policy);
        self.preprocess_rules = preprocess_rules.or(self.preprocess_rules.take());
        self.source_directory = source_directory.or(self.source_directory.take());
        self.clean_ignorable_directories =
            clean_ignorable_directories.or(self.clean_ignorable_directories.take());
        self.allow_unsafe_clean = allow_unsafe_clean.or(self.allow_unsafe_clean);
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_entry(mut self, path: impl Into<PathBuf>) -> Self {
        self.entry_path = Some(path.into());
        self
    }

    pub fn with_output_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(path.into());
        self
    }

    /// Enable or disable one experiment by name
    pub fn with_experiment(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.experiments
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), enabled);
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean_before_build = Some(clean);
        self
    }

    /// Allow cleaning `path` (relative to the project root) and everything below it
    pub fn with_ignorable_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.clean_ignorable_directories
            .get_or_insert_with(Vec::new)
            .push(path.into());
        self
    }

    /// JSON schema for the options table of `tsbundle.toml`
    pub fn json_schema() -> Result<Value> {
        let schema = schemars::schema_for!(BuildOptions);
        serde_json::to_value(schema).map_err(|e| ConfigError::invalid_value("schema", e.to_string()))
    }
}

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_rejects_unknown_fields() {
        let err = BuildOptions::from_value(json!({ "entries": ["a.ts"] })).unwrap_err();
        assert!(err.to_string().contains("entries"));
    }

    #[test]
    fn to_value_skips_unset_fields() {
        let value = BuildOptions::new().with_mode(Mode::Development).to_value().unwrap();
        assert_eq!(value, json!({ "mode": "development" }));
    }

    #[test]
    fn merge_overrides_set_fields_only() {
        let mut base = BuildOptions::new()
            .with_entry("src/index.ts")
            .with_mode(Mode::Development)
            .with_experiment("asyncWebAssembly", true);

        base.merge(
            BuildOptions::new()
                .with_mode(Mode::Production)
                .with_experiment("topLevelAwait", true),
        );

        assert_eq!(base.mode, Some(Mode::Production));
        assert_eq!(base.entry_path, Some(PathBuf::from("src/index.ts")));
        let flags = base.experiments.unwrap();
        assert_eq!(flags.get("asyncWebAssembly"), Some(&true));
        assert_eq!(flags.get("topLevelAwait"), Some(&true));
    }

    #[test]
    fn schema_lists_option_fields() {
        let schema = BuildOptions::json_schema().unwrap();
        assert!(schema["properties"]["entry_path"].is_object());
        assert!(schema["properties"]["clean_ignorable_directories"].is_object());
        assert!(schema["properties"]["experiments"].is_object());
    }
}
