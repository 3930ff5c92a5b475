//! Source map generation and ingestion policy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the engine emits debug maps, in the engine's `devtool` vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Devtool {
    /// No source maps
    None,
    /// External `.map` file with a reference comment
    #[default]
    SourceMap,
    /// Map embedded as a data URL
    InlineSourceMap,
    /// External `.map` file without a reference comment
    HiddenSourceMap,
    /// Per-module maps inside `eval` (development only)
    EvalSourceMap,
    /// Line-only maps of the loader output
    CheapModuleSourceMap,
}

impl Devtool {
    /// Engine value; `None` maps to `false` in the engine's config
    pub fn as_engine_value(&self) -> serde_json::Value {
        match self {
            Self::None => serde_json::Value::Bool(false),
            Self::SourceMap => "source-map".into(),
            Self::InlineSourceMap => "inline-source-map".into(),
            Self::HiddenSourceMap => "hidden-source-map".into(),
            Self::EvalSourceMap => "eval-source-map".into(),
            Self::CheapModuleSourceMap => "cheap-module-source-map".into(),
        }
    }

    pub fn generates_maps(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Whether and how maps are generated, and whether maps shipped with
/// already-compiled inputs are read back in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SourceMapPolicy {
    #[serde(default)]
    pub devtool: Devtool,

    #[serde(default = "crate::options::default_true")]
    pub ingest_upstream: bool,
}

impl SourceMapPolicy {
    pub const DISABLED: Self = Self {
        devtool: Devtool::None,
        ingest_upstream: false,
    };
}

impl Default for SourceMapPolicy {
    fn default() -> Self {
        Self {
            devtool: Devtool::SourceMap,
            ingest_upstream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_generates_and_ingests() {
        let policy = SourceMapPolicy::default();
        assert_eq!(policy.devtool, Devtool::SourceMap);
        assert!(policy.ingest_upstream);
    }

    #[test]
    fn partial_table_fills_defaults() {
        let policy: SourceMapPolicy =
            serde_json::from_value(serde_json::json!({ "devtool": "hidden-source-map" })).unwrap();
        assert_eq!(policy.devtool, Devtool::HiddenSourceMap);
        assert!(policy.ingest_upstream);
    }

    #[test]
    fn none_is_false_for_the_engine() {
        assert_eq!(Devtool::None.as_engine_value(), serde_json::json!(false));
        assert!(!Devtool::None.generates_maps());
        assert_eq!(
            Devtool::CheapModuleSourceMap.as_engine_value(),
            serde_json::json!("cheap-module-source-map")
        );
    }
}
