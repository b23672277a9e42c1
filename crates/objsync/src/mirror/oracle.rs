//! Per-target availability cursor

use std::cmp::Ordering;

use tracing::trace;

use crate::entry::{Entry, EntryKind};
use crate::error::{PlanError, Result};
use crate::location::ObjectUrl;
use crate::storage::EntryIter;

/// Forward-only cursor over one target's sorted recursive listing
///
/// Queries must come in non-decreasing suffix order. The cursor never
/// rewinds, and once the listing runs out every later query answers "not
/// available".
pub struct TargetCursor<I = EntryIter> {
    root: ObjectUrl,
    stream: I,
    current: Option<Entry>,
    exhausted: bool,
    force: bool,
}

impl<I> TargetCursor<I>
where
    I: Iterator<Item = Result<Entry>>,
{
    /// Cursor over `stream`, the recursive listing of `root`
    ///
    /// With `force`, a target object whose size differs is reported as
    /// needing transfer instead of as an overwrite error.
    pub fn new(root: ObjectUrl, stream: I, force: bool) -> Self {
        Self {
            root,
            stream,
            current: None,
            exhausted: false,
            force,
        }
    }

    /// Target root, with trailing separator
    pub fn root(&self) -> &ObjectUrl {
        &self.root
    }

    /// Whether `root/suffix` already holds an up-to-date copy
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::TypeMismatch`] when the target holds a node of
    /// another kind at (or above) this path, [`PlanError::OverwriteNotAllowed`]
    /// for a size mismatch without force, and forwards listing errors.
    pub fn is_available(&mut self, suffix: &str, kind: EntryKind, size: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        let expected = self.root.join(suffix).to_string();
        let separator = self.root.separator();
        loop {
            let Some(current) = &self.current else {
                if !self.advance()? {
                    return Ok(false);
                }
                continue;
            };

            match expected.as_str().cmp(current.path.as_str()) {
                Ordering::Less => {
                    // `expected/` sorts right after `expected`: a directory
                    // sits where the file should go.
                    if kind.is_file() && is_below(&current.path, &expected, separator) {
                        return Err(PlanError::TypeMismatch {
                            path: expected,
                            expected: kind,
                            actual: EntryKind::Directory,
                        });
                    }
                    return Ok(false);
                }
                Ordering::Equal => return self.compare(expected, kind, size),
                Ordering::Greater => {
                    if current.kind.is_file() && is_below(&expected, &current.path, separator) {
                        return Err(PlanError::TypeMismatch {
                            path: current.path.clone(),
                            expected: EntryKind::Directory,
                            actual: current.kind,
                        });
                    }
                    if !self.advance()? {
                        return Ok(false);
                    }
                }
            }
        }
    }

    fn compare(&self, expected: String, kind: EntryKind, size: u64) -> Result<bool> {
        let Some(current) = &self.current else {
            return Ok(false);
        };
        if current.kind != kind {
            return Err(PlanError::TypeMismatch {
                path: expected,
                expected: kind,
                actual: current.kind,
            });
        }
        if current.size == size {
            return Ok(true);
        }
        if self.force {
            trace!(path = %expected, "size differs, overwriting");
            return Ok(false);
        }
        Err(PlanError::OverwriteNotAllowed {
            path: expected,
            source_size: size,
            target_size: current.size,
        })
    }

    /// Pull the next listing entry; `false` once the listing is exhausted
    fn advance(&mut self) -> Result<bool> {
        match self.stream.next() {
            Some(Ok(entry)) => {
                self.current = Some(entry);
                Ok(true)
            }
            Some(Err(e)) => Err(e),
            None => {
                trace!(root = %self.root, "target listing exhausted");
                self.exhausted = true;
                self.current = None;
                Ok(false)
            }
        }
    }
}

/// Whether `path` lies strictly below the directory `dir`
fn is_below(path: &str, dir: &str, separator: char) -> bool {
    path.strip_prefix(dir.trim_end_matches(separator))
        .is_some_and(|rest| rest.starts_with(separator))
}
