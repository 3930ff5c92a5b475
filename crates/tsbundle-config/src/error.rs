//! Error types for configuration loading and descriptor resolution.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Discriminating reason code carried by every [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    EntryNotFound,
    UnsafeCleanTarget,
    IncompatibleExperiment,
    NonUniqueOutputNaming,
    UnrecognizedExperimentFlag,
    RelativeProjectRoot,
    InvalidValue,
    UnknownPreset,
    NotFound,
    Io,
}

impl ErrorReason {
    /// Kebab-case code used in diagnostics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryNotFound => "entry-not-found",
            Self::UnsafeCleanTarget => "unsafe-clean-target",
            Self::IncompatibleExperiment => "incompatible-experiment",
            Self::NonUniqueOutputNaming => "non-unique-output-naming",
            Self::UnrecognizedExperimentFlag => "unrecognized-experiment-flag",
            Self::RelativeProjectRoot => "relative-project-root",
            Self::InvalidValue => "invalid-value",
            Self::UnknownPreset => "unknown-preset",
            Self::NotFound => "not-found",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("entry not found: {}", .path.display())]
    #[diagnostic(
        code(tsbundle::entry_not_found),
        help("Check `entry_path`; relative paths are resolved against the project root")
    )]
    EntryNotFound { path: PathBuf },

    #[error("unsafe clean target: {} overlaps {}", .output.display(), .protected.display())]
    #[diagnostic(
        code(tsbundle::unsafe_clean_target),
        help("Point `output_directory` outside the source tree, disable `clean_before_build`, or set `allow_unsafe_clean = true`")
    )]
    UnsafeCleanTarget { output: PathBuf, protected: PathBuf },

    #[error("incompatible experiment: {experiment} {reason}")]
    #[diagnostic(code(tsbundle::incompatible_experiment))]
    IncompatibleExperiment { experiment: String, reason: String },

    #[error("non-unique output naming: `{field}` pattern `{pattern}` has no per-artifact placeholder")]
    #[diagnostic(
        code(tsbundle::non_unique_output_naming),
        help("Add a placeholder such as {expected}")
    )]
    NonUniqueOutputNaming {
        field: &'static str,
        pattern: String,
        expected: String,
    },

    #[error("unrecognized experiment flag: {name}")]
    #[diagnostic(
        code(tsbundle::unrecognized_experiment_flag),
        help("Known experiments: {known}")
    )]
    UnrecognizedExperiment { name: String, known: String },

    #[error("project root must be absolute: {}", .0.display())]
    #[diagnostic(code(tsbundle::relative_project_root))]
    RelativeProjectRoot(PathBuf),

    #[error("invalid config value for `{field}`{}", .hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    #[diagnostic(code(tsbundle::invalid_value))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("unknown preset: {name}")]
    #[diagnostic(code(tsbundle::unknown_preset), help("Available presets: {available}"))]
    UnknownPreset { name: String, available: String },

    #[error("config not found in {}", .0.display())]
    #[diagnostic(
        code(tsbundle::not_found),
        help("Create tsbundle.toml or add a `tsbundle` field to package.json")
    )]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    #[diagnostic(code(tsbundle::io))]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn reason(&self) -> ErrorReason {
        match self {
            Self::EntryNotFound { .. } => ErrorReason::EntryNotFound,
            Self::UnsafeCleanTarget { .. } => ErrorReason::UnsafeCleanTarget,
            Self::IncompatibleExperiment { .. } => ErrorReason::IncompatibleExperiment,
            Self::NonUniqueOutputNaming { .. } => ErrorReason::NonUniqueOutputNaming,
            Self::UnrecognizedExperiment { .. } => ErrorReason::UnrecognizedExperimentFlag,
            Self::RelativeProjectRoot(_) => ErrorReason::RelativeProjectRoot,
            Self::InvalidValue { .. } => ErrorReason::InvalidValue,
            Self::UnknownPreset { .. } => ErrorReason::UnknownPreset,
            Self::NotFound(_) => ErrorReason::NotFound,
            Self::Io(_) => ErrorReason::Io,
        }
    }

    /// Create an InvalidValue error with a hint
    pub fn invalid_value(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }

    pub(crate) fn incompatible(experiment: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::IncompatibleExperiment {
            experiment: experiment.to_string(),
            reason: reason.into(),
        }
    }
}
