//! Experiment flags and their compatibility rules.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};
use crate::target::Target;

/// Opt-in engine capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Experiment {
    /// WebAssembly modules loaded asynchronously (`import` of `.wasm`)
    AsyncWebAssembly,
    /// Legacy synchronous WebAssembly loading
    SyncWebAssembly,
    /// `await` at module top level
    TopLevelAwait,
    /// Emit ECMAScript modules instead of a script bundle
    OutputModule,
    /// Compile entries and dynamic imports on first use
    LazyCompilation,
    /// Native CSS module support
    Css,
}

impl Experiment {
    pub const ALL: [Experiment; 6] = [
        Experiment::AsyncWebAssembly,
        Experiment::SyncWebAssembly,
        Experiment::TopLevelAwait,
        Experiment::OutputModule,
        Experiment::LazyCompilation,
        Experiment::Css,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AsyncWebAssembly => "asyncWebAssembly",
            Self::SyncWebAssembly => "syncWebAssembly",
            Self::TopLevelAwait => "topLevelAwait",
            Self::OutputModule => "outputModule",
            Self::LazyCompilation => "lazyCompilation",
            Self::Css => "css",
        }
    }

    /// Check this experiment against the runtime target.
    pub fn check_target(&self, target: Target) -> Result<()> {
        let caps = target.capabilities();
        let requirement = match self {
            Self::AsyncWebAssembly | Self::TopLevelAwait if !caps.async_module_instantiation => {
                Some("asynchronous module instantiation")
            }
            Self::OutputModule if !caps.esm_output => Some("ECMAScript module output"),
            Self::LazyCompilation | Self::Css if !caps.browser_globals => {
                Some("a browser-like runtime")
            }
            _ => None,
        };

        match requirement {
            Some(needs) => Err(ConfigError::incompatible(
                self,
                format!("requires {needs}, which target `{target}` does not provide"),
            )),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Experiment {
    type Err = ConfigError;

    /// Names match case-insensitively, since environment variable keys arrive
    /// lowercased.
    fn from_str(s: &str) -> Result<Self> {
        Experiment::ALL
            .into_iter()
            .find(|exp| exp.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnrecognizedExperiment {
                name: s.to_string(),
                known: Experiment::ALL
                    .iter()
                    .map(Experiment::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl Serialize for Experiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Set of enabled experiments, ordered for stable output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExperimentSet(BTreeSet<Experiment>);

impl ExperimentSet {
    /// Parse a name → enabled map. Disabled entries are dropped, unknown names
    /// are rejected even when disabled. When two spellings of one name appear,
    /// the later entry wins.
    pub fn from_flags(flags: &IndexMap<String, bool>) -> Result<Self> {
        let mut set = BTreeSet::new();
        for (name, enabled) in flags {
            let experiment: Experiment = name.parse()?;
            if *enabled {
                set.insert(experiment);
            } else {
                set.remove(&experiment);
            }
        }
        Ok(Self(set))
    }

    /// Validate every enabled experiment against the target and each other.
    pub fn check(&self, target: Target) -> Result<()> {
        if self.contains(Experiment::AsyncWebAssembly) && self.contains(Experiment::SyncWebAssembly)
        {
            return Err(ConfigError::incompatible(
                Experiment::SyncWebAssembly,
                format!("cannot be combined with {}", Experiment::AsyncWebAssembly),
            ));
        }

        self.0.iter().try_for_each(|exp| exp.check_target(target))
    }

    pub fn contains(&self, experiment: Experiment) -> bool {
        self.0.contains(&experiment)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Experiment> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Experiment> for ExperimentSet {
    fn from_iter<I: IntoIterator<Item = Experiment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
