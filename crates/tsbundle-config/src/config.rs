//! Config file structure: base options plus named presets.
//!
//! For file discovery, see the `discovery` module; for environment and
//! programmatic layering, see the `loader` module.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::options::BuildOptions;
use crate::presets;

/// Contents of a `tsbundle.toml` (or equivalent) file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub options: BuildOptions,

    /// Raw preset tables, merged over `options` on demand
    pub presets: BTreeMap<String, Value>,
}

impl ConfigFile {
    /// Split a config value into base options and the `presets` table.
    ///
    /// # Example
    ///
    /// ```
    /// use tsbundle_config::ConfigFile;
    /// use serde_json::json;
    ///
    /// let file = ConfigFile::from_value(json!({
    ///     "entry_path": "src/main.ts",
    ///     "presets": { "dev": { "mode": "development" } }
    /// }))
    /// .unwrap();
    /// assert!(file.presets.contains_key("dev"));
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let mut map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(ConfigError::invalid_value(
                    "config",
                    format!("expected a table, found {other}"),
                ))
            }
        };

        let presets = match map.remove("presets") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(raw) => serde_json::from_value(raw)
                .map_err(|e| ConfigError::invalid_value("presets", e.to_string()))?,
        };

        Ok(Self {
            options: BuildOptions::from_value(Value::Object(map))?,
            presets,
        })
    }

    /// Base options with preset `name` merged over them.
    pub fn materialize_preset(self, name: Option<&str>) -> Result<BuildOptions> {
        match name {
            Some(name) => presets::apply(self.options, name, &self.presets),
            None => Ok(self.options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Mode;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn from_value_splits_presets() {
        let file = ConfigFile::from_value(json!({
            "entry_path": "src/main.ts",
            "mode": "development",
            "presets": {
                "release": { "mode": "production" }
            }
        }))
        .unwrap();

        assert_eq!(file.options.entry_path, Some(PathBuf::from("src/main.ts")));
        assert_eq!(file.options.mode, Some(Mode::Development));

        let released = file.materialize_preset(Some("release")).unwrap();
        assert_eq!(released.mode, Some(Mode::Production));
        assert_eq!(released.entry_path, Some(PathBuf::from("src/main.ts")));
    }

    #[test]
    fn from_value_rejects_non_tables() {
        assert!(ConfigFile::from_value(json!(["a"])).is_err());
        assert_eq!(ConfigFile::from_value(Value::Null).unwrap(), ConfigFile::default());
    }

    #[test]
    fn presets_must_be_a_table() {
        let err = ConfigFile::from_value(json!({ "presets": ["x"] })).unwrap_err();
        assert!(err.to_string().contains("presets"));
    }
}
