//! Local filesystem backend

use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{self, Read};
use std::iter;
use std::path::MAIN_SEPARATOR;

use tracing::trace;
use walkdir::{DirEntry, WalkDir};

use super::{EntryIter, Storage};
use crate::entry::{Entry, EntryKind};
use crate::error::{IoResultExt, PlanError, Result};
use crate::location::ObjectUrl;

/// Filesystem storage rooted at the process working directory
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a filesystem backend
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Storage for LocalFs {
    fn stat(&self, url: &ObjectUrl) -> Result<Entry> {
        let metadata = fs::metadata(url.as_path()).with_url(url.to_string())?;
        Ok(Entry::from_metadata(url.to_string(), &metadata))
    }

    fn list(&self, url: &ObjectUrl, recursive: bool) -> EntryIter {
        let root = url.to_string();
        match fs::metadata(url.as_path()) {
            Err(e) => return Box::new(iter::once(Err(PlanError::listing(root, e)))),
            Ok(metadata) if !metadata.is_dir() => {
                return Box::new(iter::once(Ok(Entry::from_metadata(root, &metadata))));
            }
            Ok(_) => {}
        }

        // Symlinks are followed so every entry gets the kind of what it
        // points at; walkdir reports loops as errors.
        let mut walker = WalkDir::new(url.as_path())
            .min_depth(1)
            .follow_links(true)
            .sort_by(listing_order);
        if !recursive {
            walker = walker.max_depth(1);
        }

        trace!(root = %root, recursive, "listing local directory");
        Box::new(
            walker
                .into_iter()
                .map(move |item| item.map_err(|e| walk_error(&root, e)).and_then(to_entry)),
        )
    }

    fn get(&self, url: &ObjectUrl) -> Result<Box<dyn Read + Send>> {
        let file = File::open(url.as_path()).with_url(url.to_string())?;
        Ok(Box::new(file))
    }

    fn put(&self, url: &ObjectUrl, _size: u64, data: &mut dyn Read) -> Result<u64> {
        let path = url.as_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_url(parent.display().to_string())?;
        }

        let mut file = File::create(path).with_url(url.to_string())?;
        io::copy(data, &mut file).with_url(url.to_string())
    }
}

/// Sibling order that makes a depth-first walk come out sorted by full path
///
/// A directory sorts as if its name ended with the separator, so `a.txt`
/// (`.` is 0x2E) is visited before everything under `a/` (`/` is 0x2F).
fn listing_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    sort_key(a).cmp(sort_key(b))
}

fn sort_key(entry: &DirEntry) -> impl Iterator<Item = u8> + '_ {
    let suffix = if entry.file_type().is_dir() {
        MAIN_SEPARATOR.to_string().into_bytes()
    } else {
        Vec::new()
    };
    entry
        .file_name()
        .as_encoded_bytes()
        .iter()
        .copied()
        .chain(suffix)
}

fn walk_error(root: &str, error: walkdir::Error) -> PlanError {
    let url = error
        .path()
        .map_or_else(|| root.to_string(), |p| p.display().to_string());
    PlanError::listing(url, io::Error::from(error))
}

fn to_entry(item: DirEntry) -> Result<Entry> {
    let Some(path) = item.path().to_str() else {
        return Err(PlanError::InvalidSource(item.path().display().to_string()));
    };
    let metadata = item
        .metadata()
        .map_err(|e| PlanError::listing(path, io::Error::from(e)))?;

    let mut entry = Entry::from_metadata(path, &metadata);
    if entry.kind == EntryKind::Directory {
        entry.path.push(MAIN_SEPARATOR);
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, rel_path: &str, content: &str) {
        let path = dir.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn root_url(tmp: &TempDir) -> ObjectUrl {
        ObjectUrl::parse(tmp.path().to_str().unwrap()).unwrap()
    }

    fn relative_paths(tmp: &TempDir, entries: &[Entry]) -> Vec<String> {
        let prefix = format!("{}{MAIN_SEPARATOR}", tmp.path().display());
        entries
            .iter()
            .map(|e| e.path.strip_prefix(&prefix).unwrap().replace(MAIN_SEPARATOR, "/"))
            .collect()
    }

    #[test]
    fn test_recursive_listing_is_sorted_by_full_path() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "a/b.txt", "b");
        create_test_file(tmp.path(), "a.txt", "a");
        create_test_file(tmp.path(), "a-b", "dash");
        create_test_file(tmp.path(), "z.txt", "z");

        let entries: Vec<Entry> = LocalFs::new()
            .list(&root_url(&tmp), true)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            relative_paths(&tmp, &entries),
            vec!["a-b", "a.txt", "a/", "a/b.txt", "z.txt"]
        );
        let paths: Vec<&String> = entries.iter().map(|e| &e.path).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_non_recursive_listing_stays_shallow() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "top.txt", "t");
        create_test_file(tmp.path(), "sub/deep.txt", "d");

        let entries: Vec<Entry> = LocalFs::new()
            .list(&root_url(&tmp), false)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(relative_paths(&tmp, &entries), vec!["sub/", "top.txt"]);
        assert!(entries[0].kind.is_dir());
        assert_eq!(entries[1].size, 1);
    }

    #[test]
    fn test_list_missing_root_yields_error() {
        let tmp = TempDir::new().unwrap();
        let missing = ObjectUrl::parse(tmp.path().join("missing").to_str().unwrap()).unwrap();

        let events: Vec<Result<Entry>> = LocalFs::new().list(&missing, true).collect();
        assert_eq!(events.len(), 1);
        assert!(events[0].as_ref().unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_file_yields_itself() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "one.txt", "12345");
        let url = ObjectUrl::parse(tmp.path().join("one.txt").to_str().unwrap()).unwrap();

        let entries: Vec<Entry> = LocalFs::new()
            .list(&url, true)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, url.to_string());
        assert_eq!(entries[0].size, 5);
    }

    #[test]
    fn test_stat_not_found() {
        let tmp = TempDir::new().unwrap();
        let url = ObjectUrl::parse(tmp.path().join("nope").to_str().unwrap()).unwrap();
        assert!(LocalFs::new().stat(&url).unwrap_err().is_not_found());
    }

    #[test]
    fn test_put_creates_parents_and_get_reads_back() {
        let tmp = TempDir::new().unwrap();
        let url = ObjectUrl::parse(tmp.path().join("x/y/z.txt").to_str().unwrap()).unwrap();
        let storage = LocalFs::new();

        let written = storage.put(&url, 5, &mut "hello".as_bytes()).unwrap();
        assert_eq!(written, 5);

        let mut content = String::new();
        storage.get(&url).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
    }
}
