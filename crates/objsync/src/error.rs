//! Error types for planning and storage operations
//!
//! Planning errors travel inside instruction streams as `Err` items, so every
//! variant carries the offending location instead of a bare message.

use std::io;

use crate::entry::EntryKind;

/// Result type alias using [`PlanError`]
pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors produced while validating arguments, planning, or talking to a
/// storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Arguments cannot be turned into any copy shape.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No source was given.
    #[error("Source list is empty")]
    SourceListEmpty,

    /// A string could not be parsed as a local path or remote URL.
    #[error("Invalid URL ‘{url}’: {reason}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A source location failed to parse mid-plan.
    #[error("Invalid source ‘{0}’")]
    InvalidSource(String),

    /// A target location failed to parse mid-plan.
    #[error("Invalid target ‘{0}’")]
    InvalidTarget(String),

    /// Remote target names an endpoint but no bucket.
    #[error("Target ‘{0}’ does not contain bucket name")]
    MissingBucket(String),

    /// The recursive marker was used on a target.
    #[error("Target ‘{0}’ cannot be recursive")]
    RecursiveTarget(String),

    /// Stat found nothing at the location.
    #[error("‘{0}’ does not exist")]
    NotFound(String),

    /// A source argument does not exist.
    #[error("Source ‘{0}’ does not exist")]
    SourceNotFound(String),

    /// A target argument does not exist.
    #[error("Target ‘{0}’ does not exist")]
    TargetNotFound(String),

    /// A directory was required for the source.
    #[error("Source ‘{0}’ is not a directory")]
    SourceIsNotDir(String),

    /// A directory was required for the target.
    #[error("Target ‘{0}’ is not a directory")]
    TargetIsNotDir(String),

    /// A regular file was required for the source.
    #[error("Source ‘{0}’ is not a regular file")]
    SourceNotRegular(String),

    /// The source was expected to carry the recursive marker.
    #[error("Source ‘{0}’ is not recursive")]
    SourceNotRecursive(String),

    /// Source and target disagree on what kind of node lives at a path.
    #[error("Type mismatch at ‘{path}’: source is a {expected}, target is a {actual}")]
    TypeMismatch {
        /// Target location holding the conflicting node.
        path: String,
        /// Kind of the source entry.
        expected: EntryKind,
        /// Kind found at the target.
        actual: EntryKind,
    },

    /// Target object exists with another size and force mode is off.
    #[error(
        "Overwrite not allowed for ‘{path}’: source has {source_size} bytes, target has {target_size} bytes"
    )]
    OverwriteNotAllowed {
        /// Target location that would be overwritten.
        path: String,
        /// Size of the source object.
        source_size: u64,
        /// Size of the existing target object.
        target_size: u64,
    },

    /// A backend enumeration failed.
    #[error("Unable to list ‘{url}’: {source}")]
    Listing {
        /// Location being listed.
        url: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A backend read, write or stat failed.
    #[error("I/O error at ‘{url}’: {source}")]
    Io {
        /// Location being accessed.
        url: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// No storage is registered for a remote host.
    #[error("No storage client configured for host ‘{0}’")]
    UnsupportedBackend(String),
}

impl PlanError {
    /// Creates an I/O error with location context.
    ///
    /// `NotFound` failures are folded into [`PlanError::NotFound`] so callers
    /// can tell a missing path from a broken backend.
    pub fn io(url: impl Into<String>, source: io::Error) -> Self {
        let url = url.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(url)
        } else {
            Self::Io { url, source }
        }
    }

    /// Creates a listing error with location context.
    pub fn listing(url: impl Into<String>, source: io::Error) -> Self {
        Self::Listing {
            url: url.into(),
            source,
        }
    }

    /// Whether this error means the location does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::SourceNotFound(_) | Self::TargetNotFound(_) => true,
            Self::Listing { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Extension trait for mapping I/O results to [`PlanError`] with location context.
pub(crate) trait IoResultExt<T> {
    /// Maps an I/O error to [`PlanError::io`] for the given location.
    fn with_url(self, url: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_url(self, url: impl Into<String>) -> Result<T> {
        self.map_err(|e| PlanError::io(url, e))
    }
}
