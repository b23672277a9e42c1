//! Listed filesystem and object-storage nodes

use std::fmt;
use std::fs::Metadata;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Kind of a listed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file or object
    File,
    /// Directory or key prefix
    Directory,
    /// Socket, FIFO, device or anything else that cannot be copied
    Other,
}

impl EntryKind {
    /// Whether this is a regular file
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Whether this is a directory
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::File => "regular file",
            Self::Directory => "directory",
            Self::Other => "special file",
        };
        f.write_str(name)
    }
}

impl From<std::fs::FileType> for EntryKind {
    fn from(file_type: std::fs::FileType) -> Self {
        if file_type.is_file() {
            Self::File
        } else if file_type.is_dir() {
            Self::Directory
        } else {
            Self::Other
        }
    }
}

/// One filesystem or object-storage node
///
/// `path` is the canonical location string. Entries produced by a listing
/// carry a trailing separator when they are directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Canonical location
    pub path: String,
    /// Node kind
    pub kind: EntryKind,
    /// Size in bytes, meaningful for regular files only
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl Entry {
    /// A regular file entry
    #[must_use]
    pub fn file(path: impl Into<String>, size: u64, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
            modified,
        }
    }

    /// A directory entry
    #[must_use]
    pub fn directory(path: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            size: 0,
            modified,
        }
    }

    /// Build an entry from filesystem metadata
    #[must_use]
    pub fn from_metadata(path: impl Into<String>, metadata: &Metadata) -> Self {
        let kind = EntryKind::from(metadata.file_type());
        Self {
            path: path.into(),
            kind,
            size: if kind.is_file() { metadata.len() } else { 0 },
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_metadata_file_and_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "hello").unwrap();

        let entry = Entry::from_metadata("a.txt", &fs::metadata(&file).unwrap());
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 5);

        let dir = Entry::from_metadata("tmp", &fs::metadata(tmp.path()).unwrap());
        assert!(dir.kind.is_dir());
        assert_eq!(dir.size, 0);
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(serde_json::to_string(&EntryKind::File).unwrap(), r#""file""#);
        assert_eq!(
            serde_json::to_string(&EntryKind::Directory).unwrap(),
            r#""directory""#
        );
    }
}
