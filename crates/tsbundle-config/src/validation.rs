//! Pluggable post-resolution validation strategies
//!
//! Separates filesystem checks (for builds on a real project tree) from
//! structural checks only (for in-memory or remote project trees, where the
//! engine reports missing files itself).

use std::path::Path;

use crate::descriptor::BuildDescriptor;
use crate::error::{ConfigError, Result};

/// Trait for pluggable descriptor validation strategies
pub trait ConfigValidator {
    /// Validate a resolved descriptor
    fn validate(&self, descriptor: &BuildDescriptor) -> Result<()>;
}

/// Structural validation only (no filesystem checks)
///
/// Every structural invariant is already enforced while resolving, so this
/// validator accepts any descriptor. Use it to defer the entry existence
/// check to the bundling engine.
///
/// # Example
///
/// ```
/// use tsbundle_config::{BuildOptions, Resolver, SchemaValidator};
///
/// let descriptor = Resolver::with_validator(SchemaValidator)
///     .resolve(&BuildOptions::default(), "/proj")
///     .unwrap();
/// assert!(descriptor.entry_path().ends_with("src/index.ts"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, _descriptor: &BuildDescriptor) -> Result<()> {
        Ok(())
    }
}

/// Filesystem validator
///
/// Checks that the entry point exists and is a regular file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, descriptor: &BuildDescriptor) -> Result<()> {
        SchemaValidator.validate(descriptor)?;
        check_entry(descriptor.entry_path())
    }
}

fn check_entry(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(ConfigError::EntryNotFound {
            path: path.to_path_buf(),
        }),
    }
}
