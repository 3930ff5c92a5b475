//! File-based config discovery
//!
//! Finds the project's config file and turns it into a figment layer.

use std::fs;
use std::path::{Path, PathBuf};

use figment::providers::{Format, Json, Serialized, Toml};
use figment::Figment;
use serde_json::Value;

use crate::config::ConfigFile;
use crate::error::{ConfigError, Result};

pub const TOML_CONFIG: &str = "tsbundle.toml";
pub const JSON_CONFIG: &str = "tsbundle.json";
pub const PACKAGE_JSON: &str = "package.json";
/// Field of `package.json` holding the config
pub const PACKAGE_FIELD: &str = "tsbundle";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use tsbundle_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new("/proj");
/// let file = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. tsbundle.toml
    /// 2. tsbundle.json
    /// 3. package.json (tsbundle field)
    pub fn find(&self) -> Option<PathBuf> {
        [TOML_CONFIG, JSON_CONFIG]
            .into_iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
            .or_else(|| {
                let pkg_path = self.root.join(PACKAGE_JSON);
                package_field(&pkg_path).ok().flatten().map(|_| pkg_path)
            })
    }

    /// Figment layer for the discovered file, empty when there is none.
    pub fn figment(&self) -> Result<Figment> {
        let Some(path) = self.find() else {
            return Ok(Figment::new());
        };
        tracing::debug!("Loading config from {}", path.display());

        if path.file_name() == Some(std::ffi::OsStr::new(PACKAGE_JSON)) {
            return Ok(match package_field(&path)? {
                Some(value) => Figment::from(Serialized::defaults(value)),
                None => Figment::new(),
            });
        }

        if path.extension() == Some(std::ffi::OsStr::new("json")) {
            Ok(Figment::from(Json::file(path)))
        } else {
            Ok(Figment::from(Toml::file(path)))
        }
    }

    /// Load the discovered file without any other layer
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<ConfigFile> {
        if self.find().is_none() {
            return Err(ConfigError::NotFound(self.root.clone()));
        }
        let value: Value = self.figment()?.extract().map_err(figment_error)?;
        ConfigFile::from_value(value)
    }
}

/// The `tsbundle` field of a package.json, if present and non-null.
fn package_field(path: &Path) -> Result<Option<Value>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let mut parsed: Value = serde_json::from_str(&content).map_err(|e| {
        ConfigError::invalid_value(PACKAGE_JSON, format!("Invalid JSON: {e}"))
    })?;

    Ok(parsed
        .get_mut(PACKAGE_FIELD)
        .map(Value::take)
        .filter(|v| !v.is_null()))
}

pub(crate) fn figment_error(err: figment::Error) -> ConfigError {
    ConfigError::invalid_value("configuration", err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn toml_wins_over_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(TOML_CONFIG), "mode = \"development\"\n").unwrap();
        fs::write(
            dir.path().join(PACKAGE_JSON),
            r#"{ "tsbundle": { "mode": "production" } }"#,
        )
        .unwrap();

        let discovery = ConfigDiscovery::new(dir.path());
        assert_eq!(discovery.find().unwrap(), dir.path().join(TOML_CONFIG));
    }

    #[test]
    fn package_json_without_field_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PACKAGE_JSON), r#"{ "name": "app" }"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());

        fs::write(dir.path().join(PACKAGE_JSON), r#"{ "tsbundle": null }"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
