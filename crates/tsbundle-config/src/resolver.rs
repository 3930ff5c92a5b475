//! Turns partial [`BuildOptions`] into a [`BuildDescriptor`].
//!
//! Resolution is a single synchronous pass: apply defaults, make paths
//! absolute, check every invariant, then run the configured validator. The
//! first failure aborts the pass, so no descriptor exists for a build that
//! would clean or write anything unsafe.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::descriptor::BuildDescriptor;
use crate::error::{ConfigError, Result};
use crate::experiments::ExperimentSet;
use crate::options::BuildOptions;
use crate::paths;
use crate::rules::{PreprocessRule, SOURCE_MAP_LOADER};
use crate::template::{ArtifactKind, FilenameTemplate};
use crate::validation::{ConfigValidator, FsValidator};

pub const DEFAULT_ENTRY: &str = "./src/index.ts";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "dist";
pub const DEFAULT_SOURCE_DIRECTORY: &str = "src";
pub const DEFAULT_OUTPUT_FILENAME: &str = "[name].js";
pub const DEFAULT_WASM_FILENAME: &str = "[id].wasm";

/// Descriptor resolver with a pluggable post-resolution validator
///
/// # Example
///
/// ```no_run
/// use tsbundle_config::{BuildOptions, Resolver};
///
/// let options = BuildOptions::new().with_entry("./src/index.ts");
/// let descriptor = Resolver::new().resolve(&options, "/proj").unwrap();
/// assert_eq!(descriptor.output_directory(), std::path::Path::new("/proj/dist"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resolver<V = FsValidator> {
    validator: V,
}

impl Resolver<FsValidator> {
    /// Resolver that checks the entry file exists
    pub fn new() -> Self {
        Self {
            validator: FsValidator,
        }
    }
}

impl<V: ConfigValidator> Resolver<V> {
    pub fn with_validator(validator: V) -> Self {
        Self { validator }
    }

    pub fn resolve(
        &self,
        options: &BuildOptions,
        project_root: impl AsRef<Path>,
    ) -> Result<BuildDescriptor> {
        let root = paths::project_root(project_root.as_ref())?;

        let mode = options.mode.unwrap_or_default();
        let target = options.target.unwrap_or_default();

        let experiments = match &options.experiments {
            Some(flags) => ExperimentSet::from_flags(flags)?,
            None => ExperimentSet::from_flags(&IndexMap::new())?,
        };
        experiments.check(target)?;

        let output_filename_pattern = FilenameTemplate::parse(
            "output_filename_pattern",
            options
                .output_filename_pattern
                .as_deref()
                .unwrap_or(DEFAULT_OUTPUT_FILENAME),
        )?;
        output_filename_pattern.require_unique("output_filename_pattern", ArtifactKind::JavaScript)?;

        let wasm_filename_pattern = FilenameTemplate::parse(
            "wasm_filename_pattern",
            options
                .wasm_filename_pattern
                .as_deref()
                .unwrap_or(DEFAULT_WASM_FILENAME),
        )?;
        wasm_filename_pattern.require_unique("wasm_filename_pattern", ArtifactKind::WebAssembly)?;

        let entry_input = options
            .entry_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENTRY));
        if entry_input.as_os_str().is_empty() {
            return Err(ConfigError::EntryNotFound { path: entry_input });
        }
        let entry_path = paths::resolve(&root, &entry_input);

        let output_directory = paths::resolve(
            &root,
            options
                .output_directory
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_OUTPUT_DIRECTORY)),
        );
        let source_directory = paths::resolve(
            &root,
            options
                .source_directory
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_SOURCE_DIRECTORY)),
        );

        let clean_before_build = options.clean_before_build.unwrap_or(true);
        if clean_before_build {
            let ignorable: Vec<PathBuf> = std::iter::once(Path::new(DEFAULT_OUTPUT_DIRECTORY))
                .chain(
                    options
                        .clean_ignorable_directories
                        .iter()
                        .flatten()
                        .map(PathBuf::as_path),
                )
                .map(|dir| paths::resolve(&root, dir))
                .collect();
            let conflict = paths::clean_conflict(
                &output_directory,
                &root,
                &source_directory,
                &entry_path,
                &ignorable,
            );
            match (conflict, options.allow_unsafe_clean.unwrap_or(false)) {
                (Some(protected), false) => {
                    return Err(ConfigError::UnsafeCleanTarget {
                        output: output_directory,
                        protected,
                    });
                }
                (Some(protected), true) => warn!(
                    output = %output_directory.display(),
                    protected = %protected.display(),
                    "cleaning an output directory that overlaps the source tree"
                ),
                (None, _) => {}
            }
        }

        let source_map_policy = options.source_map_policy.unwrap_or_default();
        if source_map_policy.ingest_upstream && !source_map_policy.devtool.generates_maps() {
            warn!("upstream source maps are ingested but no maps are generated");
        }

        let mut preprocess_rules = options.preprocess_rules.clone().unwrap_or_default();
        for (index, rule) in preprocess_rules.iter().enumerate() {
            rule.validate(index)?;
        }
        if source_map_policy.ingest_upstream
            && !preprocess_rules.iter().any(|rule| rule.runs(SOURCE_MAP_LOADER))
        {
            debug!("adding upstream source map rule");
            preprocess_rules.push(PreprocessRule::upstream_source_maps());
        }

        let descriptor = BuildDescriptor {
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
        };

        self.validator.validate(&descriptor)?;

        debug!(
            mode = mode.as_str(),
            target = target.as_str(),
            entry = %descriptor.entry_path.display(),
            output = %descriptor.output_directory.display(),
            experiments = descriptor.experiments.len(),
            "resolved build descriptor"
        );

        Ok(descriptor)
    }
}

/// Resolve options against `project_root`, checking the entry file exists.
///
/// # Example
///
/// ```no_run
/// use tsbundle_config::{resolve, BuildOptions, Mode};
///
/// let descriptor = resolve(&BuildOptions::default(), "/proj").unwrap();
/// assert_eq!(descriptor.mode(), Mode::Production);
/// assert!(descriptor.clean_before_build());
/// ```
pub fn resolve(options: &BuildOptions, project_root: impl AsRef<Path>) -> Result<BuildDescriptor> {
    Resolver::new().resolve(options, project_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorReason;
    use crate::options::Mode;
    use crate::rules::Stage;
    use crate::source_map::{Devtool, SourceMapPolicy};
    use crate::target::Target;
    use crate::validation::SchemaValidator;

    fn resolve_virtual(options: &BuildOptions) -> Result<BuildDescriptor> {
        Resolver::with_validator(SchemaValidator).resolve(options, "/proj")
    }

    #[test]
    fn entry_scenario_fills_defaults() {
        let options = BuildOptions::new().with_entry("./src/index.ts");
        let descriptor = resolve_virtual(&options).unwrap();

        assert_eq!(descriptor.entry_path(), Path::new("/proj/src/index.ts"));
        assert_eq!(descriptor.output_directory(), Path::new("/proj/dist"));
        assert_eq!(descriptor.mode(), Mode::Production);
        assert_eq!(descriptor.target(), Target::Node);
        assert!(descriptor.clean_before_build());
        assert!(descriptor.experiments().is_empty());
        assert_eq!(descriptor.output_filename_pattern().as_str(), "[name].js");
        assert_eq!(descriptor.wasm_filename_pattern().as_str(), "[id].wasm");
    }

    #[test]
    fn relative_project_root_fails() {
        let err = Resolver::with_validator(SchemaValidator)
            .resolve(&BuildOptions::default(), "proj")
            .unwrap_err();
        assert_eq!(err.reason(), ErrorReason::RelativeProjectRoot);
    }

    #[test]
    fn empty_entry_is_not_found() {
        let options = BuildOptions::new().with_entry("");
        let err = resolve_virtual(&options).unwrap_err();
        assert_eq!(err.reason(), ErrorReason::EntryNotFound);
    }

    #[test]
    fn placeholderless_pattern_fails() {
        let options = BuildOptions {
            output_filename_pattern: Some("bundle.js".into()),
            ..Default::default()
        };
        let err = resolve_virtual(&options).unwrap_err();
        assert_eq!(err.reason(), ErrorReason::NonUniqueOutputNaming);

        let options = BuildOptions {
            wasm_filename_pattern: Some("module.wasm".into()),
            ..Default::default()
        };
        let err = resolve_virtual(&options).unwrap_err();
        assert_eq!(err.reason(), ErrorReason::NonUniqueOutputNaming);
    }

    #[test]
    fn output_at_root_is_unsafe_unless_acknowledged() {
        let options = BuildOptions::new().with_output_directory("/proj");
        let err = resolve_virtual(&options).unwrap_err();
        assert_eq!(err.reason(), ErrorReason::UnsafeCleanTarget);

        let no_clean = options.clone().with_clean(false);
        assert!(resolve_virtual(&no_clean).is_ok());

        let acknowledged = BuildOptions {
            allow_unsafe_clean: Some(true),
            ..options
        };
        assert!(resolve_virtual(&acknowledged).is_ok());
    }

    #[test]
    fn undesignated_root_subdirectory_is_unsafe() {
        for output in [".git", "node_modules", "tests"] {
            let options = BuildOptions::new().with_output_directory(output);
            let err = resolve_virtual(&options).unwrap_err();
            assert_eq!(err.reason(), ErrorReason::UnsafeCleanTarget, "{output}");

            let designated = options.clone().with_ignorable_directory(output);
            assert!(resolve_virtual(&designated).is_ok(), "{output}");
        }
    }

    #[test]
    fn dist_subdirectory_and_outside_output_are_safe() {
        for output in ["dist/node", "/tmp/out"] {
            let options = BuildOptions::new().with_output_directory(output);
            assert!(resolve_virtual(&options).is_ok(), "{output}");
        }
    }

    #[test]
    fn experiment_gating_follows_target() {
        let options = BuildOptions::new()
            .with_target(Target::Node)
            .with_experiment("asyncWebAssembly", true);
        let descriptor = resolve_virtual(&options).unwrap();
        assert!(descriptor
            .experiments()
            .contains(crate::experiments::Experiment::AsyncWebAssembly));

        let err = resolve_virtual(&options.with_target(Target::Es5)).unwrap_err();
        assert_eq!(err.reason(), ErrorReason::IncompatibleExperiment);
    }

    #[test]
    fn unrecognized_experiment_fails() {
        let options = BuildOptions::new().with_experiment("asyncWasm", true);
        let err = resolve_virtual(&options).unwrap_err();
        assert_eq!(err.reason(), ErrorReason::UnrecognizedExperimentFlag);
    }

    #[test]
    fn upstream_rule_is_added_once() {
        let descriptor = resolve_virtual(&BuildOptions::default()).unwrap();
        assert_eq!(
            descriptor.preprocess_rules(),
            &[PreprocessRule::upstream_source_maps()]
        );

        let custom = PreprocessRule::new(r"\.m?js$", Stage::Pre, vec![SOURCE_MAP_LOADER.into()]);
        let options = BuildOptions {
            preprocess_rules: Some(vec![custom.clone()]),
            ..Default::default()
        };
        let descriptor = resolve_virtual(&options).unwrap();
        assert_eq!(descriptor.preprocess_rules(), &[custom]);
    }

    #[test]
    fn disabled_ingestion_adds_no_rule() {
        let options = BuildOptions {
            source_map_policy: Some(SourceMapPolicy::DISABLED),
            ..Default::default()
        };
        let descriptor = resolve_virtual(&options).unwrap();
        assert!(descriptor.preprocess_rules().is_empty());
        assert_eq!(descriptor.source_map_policy().devtool, Devtool::None);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn ingesting_without_devtool_warns_and_keeps_rule() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let options = BuildOptions {
            source_map_policy: Some(SourceMapPolicy {
                devtool: Devtool::None,
                ingest_upstream: true,
            }),
            ..Default::default()
        };
        let descriptor =
            tracing::subscriber::with_default(subscriber, || resolve_virtual(&options)).unwrap();

        assert_eq!(
            descriptor.preprocess_rules(),
            &[PreprocessRule::upstream_source_maps()]
        );
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("no maps are generated"), "{output}");
    }

    #[test]
    fn invalid_rule_is_reported_with_position() {
        let options = BuildOptions {
            preprocess_rules: Some(vec![
                PreprocessRule::upstream_source_maps(),
                PreprocessRule::new("[", Stage::Normal, vec!["ts-loader".into()]),
            ]),
            ..Default::default()
        };
        let err = resolve_virtual(&options).unwrap_err();
        assert!(err.to_string().contains("preprocess_rules[1].test"));
    }
}
