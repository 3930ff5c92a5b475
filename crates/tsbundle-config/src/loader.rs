//! Layered option loading.
//!
//! Priority: programmatic overrides > environment variables > preset > config file.
//! Defaults are not a layer here; the resolver fills whatever is still unset.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde_json::Value;

use crate::config::ConfigFile;
use crate::descriptor::BuildDescriptor;
use crate::discovery::{figment_error, ConfigDiscovery};
use crate::error::Result;
use crate::options::BuildOptions;
use crate::resolver::Resolver;

/// Prefix of environment variables read by [`ConfigLoader`].
/// Nested keys are separated by `__`, e.g. `TSBUNDLE_SOURCE_MAP_POLICY__DEVTOOL`.
pub const ENV_PREFIX: &str = "TSBUNDLE_";

/// Options read from the environment verbatim. Figment would otherwise parse
/// `[name].js` as an array or `123` as an integer.
const RAW_ENV_KEYS: [&str; 5] = [
    "entry_path",
    "output_directory",
    "output_filename_pattern",
    "wasm_filename_pattern",
    "source_directory",
];

/// Loads options for a project root from its config file, the environment and
/// explicit overrides, then materializes an optional preset.
///
/// # Example
///
/// ```no_run
/// use tsbundle_config::{BuildOptions, ConfigLoader, Mode};
///
/// let descriptor = ConfigLoader::new("/proj")
///     .preset("node-wasm")
///     .overrides(BuildOptions::new().with_mode(Mode::Development))
///     .resolve()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    preset: Option<String>,
    overrides: BuildOptions,
    read_env: bool,
}

impl ConfigLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            preset: None,
            overrides: BuildOptions::default(),
            read_env: true,
        }
    }

    pub fn preset(mut self, name: impl Into<String>) -> Self {
        self.preset = Some(name.into());
        self
    }

    /// Options layered above the file and the environment
    pub fn overrides(mut self, overrides: BuildOptions) -> Self {
        self.overrides = overrides;
        self
    }

    /// Skip `TSBUNDLE_*` environment variables
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Merge all layers into one set of partial options.
    ///
    /// The preset is materialized against the file alone, so environment
    /// variables and overrides still win over preset values.
    pub fn load(&self) -> Result<BuildOptions> {
        let file_value: Value = ConfigDiscovery::new(&self.root)
            .figment()?
            .extract()
            .map_err(figment_error)?;
        let options = ConfigFile::from_value(file_value)?.materialize_preset(self.preset.as_deref())?;

        let mut figment = Figment::from(Serialized::defaults(options));
        if self.read_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&RAW_ENV_KEYS));
            for (key, value) in Env::prefixed(ENV_PREFIX).only(&RAW_ENV_KEYS).iter() {
                figment = figment.merge(Serialized::default(key.as_str(), value));
            }
        }

        let layered: Value = figment.extract().map_err(figment_error)?;
        let mut options = BuildOptions::from_value(layered)?;
        options.merge(self.overrides.clone());
        Ok(options)
    }

    /// Load and resolve against the loader's root, checking the entry exists.
    pub fn resolve(&self) -> Result<BuildDescriptor> {
        let options = self.load()?;
        Resolver::new().resolve(&options, &self.root)
    }
}

/// Load the project's config with an optional preset and resolve it.
///
/// # Example
///
/// ```no_run
/// use tsbundle_config::load_and_resolve;
///
/// let descriptor = load_and_resolve("/proj", Some("node-wasm-lean")).unwrap();
/// ```
pub fn load_and_resolve(root: impl AsRef<Path>, preset: Option<&str>) -> Result<BuildDescriptor> {
    let mut loader = ConfigLoader::new(root);
    if let Some(name) = preset {
        loader = loader.preset(name);
    }
    loader.resolve()
}
