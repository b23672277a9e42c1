//! Argument shape classification and up-front validation

use tracing::debug;

use crate::error::{PlanError, Result};
use crate::location::{ObjectUrl, is_recursive, strip_recursive};
use crate::storage::Storage;

/// How the source and target arguments of a copy combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeVariant {
    /// A: one file copied to a file path
    SingleFileToFile,
    /// B: one file copied into an existing directory
    SingleFileToDirectory,
    /// C: one recursive source copied into a directory
    RecursiveDirToDirectory,
    /// D: several sources copied into an existing directory
    MultiSourceToDirectory,
    /// Arguments do not describe any copy
    Invalid,
}

/// Classify `(sources, target)` into a copy shape
///
/// Only B needs the backend: it is chosen when the target already exists as
/// a directory.
pub fn classify(storage: &dyn Storage, sources: &[String], target: &str) -> ShapeVariant {
    if target.trim().is_empty() || sources.is_empty() {
        return ShapeVariant::Invalid;
    }

    let shape = match sources {
        [source] if is_recursive(source) => ShapeVariant::RecursiveDirToDirectory,
        [_] if is_existing_dir(storage, target) => ShapeVariant::SingleFileToDirectory,
        [_] => ShapeVariant::SingleFileToFile,
        _ => ShapeVariant::MultiSourceToDirectory,
    };
    debug!(?shape, sources = sources.len(), target, "classified copy arguments");
    shape
}

/// Whether `raw` parses and stats as an existing directory
pub fn is_existing_dir(storage: &dyn Storage, raw: &str) -> bool {
    ObjectUrl::parse(raw)
        .and_then(|url| storage.stat(&url))
        .is_ok_and(|entry| entry.kind.is_dir())
}

/// Validate copy arguments before any instruction is produced
///
/// # Errors
///
/// Returns the first problem found: empty arguments, unparsable locations, a
/// recursive or bucket-less target, a recursive source that is not an
/// existing directory, or a missing target directory for several sources.
pub fn check_copy_syntax(
    storage: &dyn Storage,
    sources: &[String],
    target: &str,
) -> Result<ShapeVariant> {
    if sources.is_empty() {
        return Err(PlanError::SourceListEmpty);
    }
    if target.trim().is_empty() {
        return Err(PlanError::InvalidArgument("target is empty".to_string()));
    }
    for source in sources {
        ObjectUrl::parse(&strip_recursive(source))?;
    }

    if is_recursive(target) {
        return Err(PlanError::RecursiveTarget(target.to_string()));
    }
    check_bucket(&ObjectUrl::parse(target)?)?;

    let shape = classify(storage, sources, target);
    match shape {
        ShapeVariant::SingleFileToFile | ShapeVariant::SingleFileToDirectory => {}
        ShapeVariant::RecursiveDirToDirectory => check_recursive_source(storage, &sources[0])?,
        ShapeVariant::MultiSourceToDirectory => {
            check_target_dir(storage, target)?;
            for source in sources.iter().filter(|s| is_recursive(s)) {
                check_recursive_source(storage, source)?;
            }
        }
        ShapeVariant::Invalid => {
            return Err(PlanError::InvalidArgument(
                "unable to determine how to copy".to_string(),
            ));
        }
    }
    Ok(shape)
}

/// Validate mirror arguments before any instruction is produced
///
/// A target that does not exist yet is accepted; an existing one must be a
/// directory.
///
/// # Errors
///
/// Returns the first problem found: no targets, a source that is not an
/// existing directory, or a target that is recursive, bucket-less, or not a
/// directory.
pub fn check_mirror_syntax(storage: &dyn Storage, source: &str, targets: &[String]) -> Result<()> {
    if targets.is_empty() {
        return Err(PlanError::InvalidArgument(
            "mirror needs at least one target".to_string(),
        ));
    }

    let source_root = strip_recursive(source);
    let source_url = ObjectUrl::parse(&source_root)?;
    match storage.stat(&source_url) {
        Ok(entry) if !entry.kind.is_dir() => return Err(PlanError::SourceIsNotDir(source_root)),
        Ok(_) => {}
        Err(e) if e.is_not_found() => return Err(PlanError::SourceNotFound(source_root)),
        Err(e) => return Err(e),
    }

    for target in targets {
        if is_recursive(target) {
            return Err(PlanError::RecursiveTarget(target.clone()));
        }
        let target_url = ObjectUrl::parse(target)?;
        check_bucket(&target_url)?;
        match storage.stat(&target_url) {
            Ok(entry) if !entry.kind.is_dir() => {
                return Err(PlanError::TargetIsNotDir(target.clone()));
            }
            Err(e) if !e.is_not_found() => return Err(e),
            _ => {}
        }
    }
    Ok(())
}

fn check_bucket(url: &ObjectUrl) -> Result<()> {
    if url.is_remote() && url.bucket().is_none() {
        return Err(PlanError::MissingBucket(url.to_string()));
    }
    Ok(())
}

fn check_recursive_source(storage: &dyn Storage, source: &str) -> Result<()> {
    let root = strip_recursive(source);
    let url = ObjectUrl::parse(&root)?;
    match storage.stat(&url) {
        Ok(entry) if entry.kind.is_dir() => Ok(()),
        Ok(_) => Err(PlanError::SourceIsNotDir(root)),
        Err(e) if e.is_not_found() => Err(PlanError::SourceNotFound(root)),
        Err(e) => Err(e),
    }
}

fn check_target_dir(storage: &dyn Storage, target: &str) -> Result<()> {
    match storage.stat(&ObjectUrl::parse(target)?) {
        Ok(entry) if entry.kind.is_dir() => Ok(()),
        Ok(_) => Err(PlanError::TargetIsNotDir(target.to_string())),
        Err(e) if e.is_not_found() => Err(PlanError::TargetNotFound(target.to_string())),
        Err(e) => Err(e),
    }
}
