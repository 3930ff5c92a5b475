//! Runtime targets and the capabilities each one guarantees.
//!
//! The bundling engine uses the target to decide which built-in modules and
//! globals it may assume exist. The resolver uses the capability table to gate
//! experiments that depend on runtime features.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime environment the emitted bundle assumes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Node.js with synchronous chunk loading (default)
    #[default]
    Node,
    /// Node.js with chunks loaded through `fs` + `vm`
    AsyncNode,
    /// Browser main thread
    Web,
    /// Web Worker
    #[serde(rename = "webworker")]
    WebWorker,
    /// Electron main process
    ElectronMain,
    /// Electron renderer process
    ElectronRenderer,
    /// Legacy ES5 environments
    Es5,
}

/// Features a target runtime is guaranteed to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetCapabilities {
    /// `WebAssembly.instantiate` and promise-based module loading
    pub async_module_instantiation: bool,
    /// Native ECMAScript module output
    pub esm_output: bool,
    /// Node.js built-ins (`fs`, `path`, ...) are available
    pub node_builtins: bool,
    /// `window`/`self` and DOM-style globals are available
    pub browser_globals: bool,
}

impl Target {
    pub const ALL: [Target; 7] = [
        Target::Node,
        Target::AsyncNode,
        Target::Web,
        Target::WebWorker,
        Target::ElectronMain,
        Target::ElectronRenderer,
        Target::Es5,
    ];

    /// Name in the bundling engine's vocabulary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::AsyncNode => "async-node",
            Self::Web => "web",
            Self::WebWorker => "webworker",
            Self::ElectronMain => "electron-main",
            Self::ElectronRenderer => "electron-renderer",
            Self::Es5 => "es5",
        }
    }

    pub fn capabilities(&self) -> TargetCapabilities {
        match self {
            Self::Node | Self::AsyncNode | Self::ElectronMain => TargetCapabilities {
                async_module_instantiation: true,
                esm_output: true,
                node_builtins: true,
                browser_globals: false,
            },
            Self::Web | Self::WebWorker => TargetCapabilities {
                async_module_instantiation: true,
                esm_output: true,
                node_builtins: false,
                browser_globals: true,
            },
            Self::ElectronRenderer => TargetCapabilities {
                async_module_instantiation: true,
                esm_output: true,
                node_builtins: true,
                browser_globals: true,
            },
            Self::Es5 => TargetCapabilities {
                async_module_instantiation: false,
                esm_output: false,
                node_builtins: false,
                browser_globals: false,
            },
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Target::ALL.iter().map(Target::as_str).collect();
                ConfigError::invalid_value("target", format!("expected one of {}", known.join(", ")))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for target in Target::ALL {
            assert_eq!(target.as_str().parse::<Target>().unwrap(), target);
        }
        assert!("deno".parse::<Target>().is_err());
    }

    #[test]
    fn serde_uses_engine_vocabulary() {
        assert_eq!(serde_json::to_string(&Target::WebWorker).unwrap(), "\"webworker\"");
        assert_eq!(serde_json::to_string(&Target::AsyncNode).unwrap(), "\"async-node\"");
        let parsed: Target = serde_json::from_str("\"electron-main\"").unwrap();
        assert_eq!(parsed, Target::ElectronMain);
    }

    #[test]
    fn es5_cannot_instantiate_modules_asynchronously() {
        assert!(!Target::Es5.capabilities().async_module_instantiation);
        assert!(Target::Node.capabilities().async_module_instantiation);
        assert!(!Target::Node.capabilities().browser_globals);
        assert!(Target::Web.capabilities().browser_globals);
    }
}
