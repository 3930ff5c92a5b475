//! # tsbundle-config
//!
//! Resolves partial build options into the immutable [`BuildDescriptor`] a
//! bundling engine consumes when packaging a TypeScript project (with async
//! WebAssembly support) for a server-side JavaScript runtime.
//!
//! ```no_run
//! use tsbundle_config::{resolve, BuildOptions};
//!
//! let options = BuildOptions::new()
//!     .with_entry("./src/index.ts")
//!     .with_experiment("asyncWebAssembly", true);
//! let descriptor = resolve(&options, "/proj").unwrap();
//! println!("{}", descriptor.to_engine_config());
//! ```

pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod experiments;
pub mod loader;
pub mod options;
pub mod paths;
pub mod presets;
pub mod resolver;
pub mod rules;
pub mod source_map;
pub mod target;
pub mod template;
pub mod validation;

#[cfg(feature = "logging")]
pub mod logging;

// Re-export main types
pub use config::ConfigFile;
pub use descriptor::BuildDescriptor;
pub use error::*;
pub use experiments::{Experiment, ExperimentSet};
pub use options::{BuildOptions, Mode};
pub use resolver::{resolve, Resolver};
pub use rules::{PreprocessRule, Stage};
pub use source_map::{Devtool, SourceMapPolicy};
pub use target::{Target, TargetCapabilities};
pub use template::{ArtifactInfo, ArtifactKind, FilenameTemplate, Placeholder};

// Re-export loading and validation
pub use discovery::ConfigDiscovery;
pub use loader::{load_and_resolve, ConfigLoader};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator};
