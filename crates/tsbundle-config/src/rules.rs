//! Pre-processing rules applied to matching inputs.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Transform that reads maps referenced by already-compiled inputs
pub const SOURCE_MAP_LOADER: &str = "source-map-loader";

/// When a rule runs relative to the main compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Before the main compilation stage
    Pre,
    #[default]
    Normal,
    /// After the main compilation stage
    Post,
}

/// One `(pattern, stage, transforms)` rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PreprocessRule {
    /// Regex matched against the absolute input path
    pub test: String,

    #[serde(default)]
    pub enforce: Stage,

    /// Transform names, applied in order
    #[serde(rename = "use")]
    pub transforms: Vec<String>,
}

impl PreprocessRule {
    pub fn new(test: impl Into<String>, enforce: Stage, transforms: Vec<String>) -> Self {
        Self {
            test: test.into(),
            enforce,
            transforms,
        }
    }

    /// Rule ingesting upstream maps from compiled JavaScript inputs
    pub fn upstream_source_maps() -> Self {
        Self::new(r"\.js$", Stage::Pre, vec![SOURCE_MAP_LOADER.to_string()])
    }

    pub fn runs(&self, transform: &str) -> bool {
        self.transforms.iter().any(|t| t == transform)
    }

    /// Check that the pattern compiles and the transform list is usable.
    /// `index` is the rule's position, used in error messages.
    pub fn validate(&self, index: usize) -> Result<()> {
        let field = format!("preprocess_rules[{index}]");

        Regex::new(&self.test).map_err(|e| {
            ConfigError::invalid_value(format!("{field}.test"), format!("invalid pattern: {e}"))
        })?;

        if self.transforms.is_empty() {
            return Err(ConfigError::invalid_value(
                format!("{field}.use"),
                "a rule needs at least one transform",
            ));
        }

        if self.transforms.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                format!("{field}.use"),
                "transform names cannot be empty",
            ));
        }

        Ok(())
    }

    /// Whether this rule applies to `path`. Patterns are validated during
    /// resolution, so an invalid pattern here simply matches nothing.
    pub fn matches(&self, path: &str) -> bool {
        Regex::new(&self.test).is_ok_and(|re| re.is_match(path))
    }
}
