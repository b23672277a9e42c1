//! Lazy copy plan generation, one sub-generator per shape

use std::iter;
use std::sync::Arc;

use tracing::{debug, warn};

use super::shape::{ShapeVariant, check_copy_syntax};
use crate::entry::Entry;
use crate::error::{PlanError, Result};
use crate::listing::Listing;
use crate::location::{ObjectUrl, is_recursive, strip_recursive};
use crate::storage::Storage;

/// One object to copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyInstruction {
    /// Source object as it was stat'ed or listed
    pub source: Entry,
    /// Location the object is written to
    pub target: ObjectUrl,
}

/// Lazy stream of copy instructions; problems travel as `Err` items
pub type CopyPlan = Box<dyn Iterator<Item = Result<CopyInstruction>> + Send>;

/// Expands copy arguments into single-object copy instructions
///
/// Nothing touches the backend until the returned plan is pulled, apart
/// from argument validation in [`CopyPlanner::plan`].
#[derive(Clone)]
pub struct CopyPlanner {
    storage: Arc<dyn Storage>,
}

impl CopyPlanner {
    /// Creates a planner over `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Validate the arguments and expand them into a plan
    ///
    /// A validation failure becomes the only item of the plan.
    pub fn plan(&self, sources: &[String], target: &str) -> CopyPlan {
        match check_copy_syntax(&*self.storage, sources, target) {
            Ok(shape) => self.plan_shape(shape, sources, target),
            Err(e) => Box::new(iter::once(Err(e))),
        }
    }

    /// Expand arguments already classified as `shape`
    pub fn plan_shape(&self, shape: ShapeVariant, sources: &[String], target: &str) -> CopyPlan {
        debug!(?shape, target, "planning copy");
        match (shape, sources) {
            (ShapeVariant::SingleFileToFile, [source]) => self.file_to_file(source, target),
            (ShapeVariant::SingleFileToDirectory, [source]) => self.file_to_dir(source, target),
            (ShapeVariant::RecursiveDirToDirectory, [source]) => self.dir_to_dir(source, target),
            (ShapeVariant::MultiSourceToDirectory, [_, ..]) => self.multi_to_dir(sources, target),
            _ => Box::new(iter::once(Err(PlanError::InvalidArgument(
                "unable to determine how to copy".to_string(),
            )))),
        }
    }

    /// A: one instruction with source and target unchanged
    pub fn file_to_file(&self, source: &str, target: &str) -> CopyPlan {
        let storage = Arc::clone(&self.storage);
        let (source, target) = (source.to_string(), target.to_string());
        Box::new(iter::once_with(move || {
            let target = parse_target(&target)?;
            single_copy(&*storage, &source, target)
        }))
    }

    /// B: copy into `target/basename(source)`
    pub fn file_to_dir(&self, source: &str, target: &str) -> CopyPlan {
        let storage = Arc::clone(&self.storage);
        let (source, target) = (source.to_string(), target.to_string());
        Box::new(iter::once_with(move || {
            let name = parse_source(&source)?.base_name().to_string();
            let target = parse_target(&target)?.join(&name);
            single_copy(&*storage, &source, target)
        }))
    }

    /// C: one instruction per regular file under a recursive source
    ///
    /// Listing errors are forwarded and the walk carries on with the
    /// remaining entries.
    pub fn dir_to_dir(&self, source: &str, target: &str) -> CopyPlan {
        if !is_recursive(source) {
            return Box::new(iter::once(Err(PlanError::SourceNotRecursive(
                source.to_string(),
            ))));
        }

        let storage = Arc::clone(&self.storage);
        let (source, target) = (source.to_string(), target.to_string());
        Box::new(
            iter::once_with(move || TreeCopy::open(storage, &source, &target)).flat_map(
                |opened| -> CopyPlan {
                    match opened {
                        Ok(tree) => Box::new(tree),
                        Err(e) => Box::new(iter::once(Err(e))),
                    }
                },
            ),
        )
    }

    /// D: B or C per source, concatenated in argument order
    pub fn multi_to_dir(&self, sources: &[String], target: &str) -> CopyPlan {
        let planner = self.clone();
        let target = target.to_string();
        Box::new(sources.to_vec().into_iter().flat_map(move |source| {
            if is_recursive(&source) {
                planner.dir_to_dir(&source, &target)
            } else {
                planner.file_to_dir(&source, &target)
            }
        }))
    }
}

fn parse_source(raw: &str) -> Result<ObjectUrl> {
    ObjectUrl::parse(raw).map_err(|_| PlanError::InvalidSource(raw.to_string()))
}

fn parse_target(raw: &str) -> Result<ObjectUrl> {
    ObjectUrl::parse(raw).map_err(|_| PlanError::InvalidTarget(raw.to_string()))
}

fn single_copy(storage: &dyn Storage, source: &str, target: ObjectUrl) -> Result<CopyInstruction> {
    let url = parse_source(source)?;
    let entry = storage.stat(&url).map_err(|e| {
        if e.is_not_found() {
            PlanError::SourceNotFound(source.to_string())
        } else {
            e
        }
    })?;
    if !entry.kind.is_file() {
        return Err(PlanError::SourceNotRegular(source.to_string()));
    }
    Ok(CopyInstruction {
        source: entry,
        target,
    })
}

/// Walk of one recursive source, mapped onto a target directory
struct TreeCopy {
    listing: Listing,
    prefix: String,
    target: ObjectUrl,
}

impl TreeCopy {
    fn open(storage: Arc<dyn Storage>, source: &str, target: &str) -> Result<Self> {
        let root = strip_recursive(source);
        let root_url = parse_source(&root)?;
        let target = parse_target(target)?;

        match storage.stat(&root_url) {
            Ok(entry) if entry.kind.is_dir() => {}
            Ok(_) => return Err(PlanError::SourceIsNotDir(root)),
            Err(e) if e.is_not_found() => return Err(PlanError::SourceNotFound(root)),
            Err(e) => return Err(e),
        }

        let root_url = root_url.with_trailing_separator();
        let prefix = root_url.to_string();
        debug!(root = %prefix, target = %target, "expanding recursive source");
        Ok(Self {
            listing: Listing::spawn(storage, root_url, true),
            prefix,
            target,
        })
    }

    fn instruction(&self, entry: Entry) -> Result<CopyInstruction> {
        let Some(suffix) = entry.path.strip_prefix(&self.prefix) else {
            return Err(PlanError::InvalidSource(entry.path));
        };
        Ok(CopyInstruction {
            target: self.target.join(suffix),
            source: entry,
        })
    }
}

impl Iterator for TreeCopy {
    type Item = Result<CopyInstruction>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.listing.next()? {
                Ok(entry) if entry.kind.is_dir() => {}
                Ok(entry) if !entry.kind.is_file() => {
                    warn!(path = %entry.path, "skipping special file");
                }
                Ok(entry) => return Some(self.instruction(entry)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
