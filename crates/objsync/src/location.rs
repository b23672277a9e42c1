//! Location parsing and path utilities
//!
//! A location is either a local path (platform separator) or a remote URL of
//! the form `scheme://host/bucket/key` (always `/`). Sources may end with the
//! recursive marker `...`, optionally followed by separators, meaning "this
//! directory and its whole subtree".

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path};

use crate::error::{PlanError, Result};

/// Suffix marking a source for recursive expansion
pub const RECURSIVE_MARKER: &str = "...";

/// Backend family a location belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlKind {
    /// Local filesystem path
    Local,
    /// Object-storage URL
    Remote,
}

/// A parsed local path or remote object URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl {
    kind: UrlKind,
    scheme: String,
    host: String,
    path: String,
    separator: char,
}

impl ObjectUrl {
    /// Parse a local path or remote URL
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidUrl`] for blank input, malformed URLs and
    /// URLs without a host.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| PlanError::InvalidUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("empty location"));
        }

        if !raw.contains("://") {
            return Ok(Self {
                kind: UrlKind::Local,
                scheme: String::new(),
                host: String::new(),
                path: raw.to_string(),
                separator: MAIN_SEPARATOR,
            });
        }

        let trimmed = raw.trim();
        let parsed = ::url::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?;
        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        // Object keys are kept exactly as typed. `Url::path` is
        // percent-encoded and would not match keys built with `join`.
        let path = trimmed
            .split_once("://")
            .and_then(|(_, rest)| rest.find('/').map(|slash| &rest[slash..]))
            .unwrap_or("/")
            .to_string();

        Ok(Self {
            kind: UrlKind::Remote,
            scheme: parsed.scheme().to_string(),
            host,
            path,
            separator: '/',
        })
    }

    /// Backend family
    #[must_use]
    pub const fn kind(&self) -> UrlKind {
        self.kind
    }

    /// Whether this is an object-storage URL
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.kind == UrlKind::Remote
    }

    /// Remote host (with port), empty for local paths
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path component
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path separator used by this backend
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Local path view of this location
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// First path segment of a remote URL
    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        if !self.is_remote() {
            return None;
        }
        self.path.split('/').find(|segment| !segment.is_empty())
    }

    /// The bucket this remote URL points into, as `scheme://host/bucket`
    #[must_use]
    pub fn bucket_url(&self) -> Option<Self> {
        let bucket = self.bucket()?;
        Some(self.with_path(format!("/{bucket}")))
    }

    /// Final path segment, ignoring trailing separators
    #[must_use]
    pub fn base_name(&self) -> &str {
        basename(&self.path, self.separator)
    }

    /// Same location with exactly one trailing separator
    #[must_use]
    pub fn with_trailing_separator(&self) -> Self {
        let trimmed = self.path.trim_end_matches(self.separator);
        let mut path = String::with_capacity(trimmed.len() + 1);
        path.push_str(trimmed);
        path.push(self.separator);
        self.with_path(path)
    }

    /// Append `suffix` below this location
    ///
    /// Separators in `suffix` are converted to this backend's separator, so a
    /// suffix computed on a local listing can be joined onto a remote target.
    #[must_use]
    pub fn join(&self, suffix: &str) -> Self {
        let suffix = convert_separators(suffix, self.separator);
        self.with_path(join_path(&self.path, &suffix, self.separator))
    }

    fn with_path(&self, path: String) -> Self {
        Self {
            kind: self.kind,
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            path,
            separator: self.separator,
        }
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UrlKind::Local => f.write_str(&self.path),
            UrlKind::Remote => write!(f, "{}://{}{}", self.scheme, self.host, self.path),
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

/// Whether a raw argument carries the recursive marker
#[must_use]
pub fn is_recursive(raw: &str) -> bool {
    raw.trim_end_matches(is_separator)
        .ends_with(RECURSIVE_MARKER)
}

/// Remove the recursive marker and the separator in front of it
///
/// `dir/...` and `dir/.../` both become `dir`; a bare `...` becomes `.`.
/// Arguments without the marker are returned unchanged.
#[must_use]
pub fn strip_recursive(raw: &str) -> String {
    let Some(rest) = raw
        .trim_end_matches(is_separator)
        .strip_suffix(RECURSIVE_MARKER)
    else {
        return raw.to_string();
    };

    let base = rest.trim_end_matches(is_separator);
    if !base.is_empty() {
        return base.to_string();
    }
    // Only separators (or nothing) in front of the marker.
    match rest.chars().next() {
        Some(root) => root.to_string(),
        None => ".".to_string(),
    }
}

/// Join two path segments with exactly one separator between them
#[must_use]
pub fn join_path(base: &str, suffix: &str, separator: char) -> String {
    let suffix = suffix.trim_start_matches(separator);
    if suffix.is_empty() {
        return base.to_string();
    }
    if base.is_empty() {
        return suffix.to_string();
    }
    format!("{}{separator}{suffix}", base.trim_end_matches(separator))
}

/// Final non-empty segment of a path
#[must_use]
pub fn basename(path: &str, separator: char) -> &str {
    let trimmed = path.trim_end_matches(separator);
    trimmed
        .rsplit(separator)
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(trimmed)
}

fn convert_separators(suffix: &str, separator: char) -> String {
    suffix
        .chars()
        .map(|c| if is_separator(c) { separator } else { c })
        .collect()
}
