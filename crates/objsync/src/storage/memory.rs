//! In-memory object store with S3-like bucket and key semantics
//!
//! Objects are keyed by their full canonical URL, so a `BTreeMap` walk is
//! already in listing order. Buckets must exist before objects can be put
//! into them. Listing failures can be injected per key to exercise
//! partial-failure handling.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::{self, Cursor, Read};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use super::{EntryIter, Storage};
use crate::entry::Entry;
use crate::error::{PlanError, Result};
use crate::location::ObjectUrl;

#[derive(Debug, Clone)]
struct Object {
    data: Vec<u8>,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct Inner {
    buckets: BTreeSet<String>,
    objects: BTreeMap<String, Object>,
    failures: BTreeSet<String>,
}

/// Object store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the bucket named by `url`
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a remote URL with a bucket segment.
    pub fn make_bucket(&self, url: &str) -> Result<()> {
        let url = ObjectUrl::parse(url)?;
        let bucket = bucket_root(&url).ok_or_else(|| PlanError::MissingBucket(url.to_string()))?;
        self.lock().buckets.insert(bucket);
        Ok(())
    }

    /// Store an object, creating its bucket when needed
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a remote URL with a bucket segment.
    pub fn insert(&self, url: &str, data: impl Into<Vec<u8>>) -> Result<()> {
        let url = ObjectUrl::parse(url)?;
        let bucket = bucket_root(&url).ok_or_else(|| PlanError::MissingBucket(url.to_string()))?;
        let mut inner = self.lock();
        inner.buckets.insert(bucket);
        inner.objects.insert(
            url.to_string(),
            Object {
                data: data.into(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    /// Make recursive listings report an error in place of the object at `url`
    pub fn fail_listing_at(&self, url: &str) {
        if let Ok(url) = ObjectUrl::parse(url) {
            self.lock().failures.insert(url.to_string());
        }
    }

    /// Contents of the object at `url`
    #[must_use]
    pub fn read(&self, url: &str) -> Option<Vec<u8>> {
        let url = ObjectUrl::parse(url).ok()?;
        self.lock()
            .objects
            .get(&url.to_string())
            .map(|object| object.data.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keys fetched per lock, like one page of a remote list call
const PAGE_SIZE: usize = 64;

/// Listing that reads the key space one page at a time
///
/// Objects written between pages show up if they sort after the last key
/// already returned.
struct Pages {
    inner: Arc<Mutex<Inner>>,
    prefix: String,
    recursive: bool,
    after: Option<String>,
    last_prefix: Option<String>,
    page: VecDeque<Result<Entry>>,
    done: bool,
}

impl Pages {
    fn fill(&mut self) {
        let inner = lock(&self.inner);
        let start = match self.after.take() {
            Some(key) => Bound::Excluded(key),
            None => Bound::Included(self.prefix.clone()),
        };

        let mut fetched = 0;
        let mut last = None;
        for (name, object) in inner
            .objects
            .range::<String, _>((start, Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(&self.prefix))
            .take(PAGE_SIZE)
        {
            fetched += 1;
            last = Some(name.clone());

            let rest = &name[self.prefix.len()..];
            if !self.recursive {
                if let Some(slash) = rest.find('/') {
                    let common = format!("{}{}", self.prefix, &rest[..=slash]);
                    if self.last_prefix.as_deref() != Some(common.as_str()) {
                        self.page
                            .push_back(Ok(Entry::directory(common.clone(), SystemTime::UNIX_EPOCH)));
                        self.last_prefix = Some(common);
                    }
                    continue;
                }
            }

            if inner.failures.contains(name) {
                let error = io::Error::other("injected listing failure");
                self.page.push_back(Err(PlanError::listing(name.clone(), error)));
                continue;
            }
            self.page.push_back(Ok(Entry::file(
                name.clone(),
                object.data.len() as u64,
                object.modified,
            )));
        }

        self.after = last;
        self.done = fetched < PAGE_SIZE;
    }
}

impl Iterator for Pages {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.page.pop_front() {
                return Some(item);
            }
            if self.done {
                return None;
            }
            self.fill();
        }
    }
}

/// `scheme://host/bucket` for a remote URL with a bucket segment
fn bucket_root(url: &ObjectUrl) -> Option<String> {
    url.bucket_url().map(|bucket| bucket.to_string())
}

fn key_of(url: &ObjectUrl) -> String {
    url.to_string().trim_end_matches('/').to_string()
}

impl Storage for MemoryStore {
    fn stat(&self, url: &ObjectUrl) -> Result<Entry> {
        let Some(bucket) = bucket_root(url) else {
            // Endpoint root: the list of buckets.
            return Ok(Entry::directory(url.to_string(), SystemTime::UNIX_EPOCH));
        };

        let inner = self.lock();
        let key = key_of(url);
        if let Some(object) = inner.objects.get(&key) {
            return Ok(Entry::file(
                key,
                object.data.len() as u64,
                object.modified,
            ));
        }

        let prefix = format!("{key}/");
        let is_bucket = key == bucket && inner.buckets.contains(&bucket);
        let has_children = inner
            .objects
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&prefix));
        if is_bucket || has_children {
            return Ok(Entry::directory(url.to_string(), SystemTime::UNIX_EPOCH));
        }

        Err(PlanError::NotFound(url.to_string()))
    }

    fn list(&self, url: &ObjectUrl, recursive: bool) -> EntryIter {
        let inner = self.lock();
        let key = key_of(url);

        if let Some(object) = inner.objects.get(&key) {
            let entry = Entry::file(key, object.data.len() as u64, object.modified);
            return Box::new(std::iter::once(Ok(entry)));
        }

        let bucket_exists = bucket_root(url).is_some_and(|b| inner.buckets.contains(&b));
        if !bucket_exists {
            let error = io::Error::new(io::ErrorKind::NotFound, "bucket does not exist");
            return Box::new(std::iter::once(Err(PlanError::listing(url.to_string(), error))));
        }

        Box::new(Pages {
            inner: Arc::clone(&self.inner),
            prefix: format!("{key}/"),
            recursive,
            after: None,
            last_prefix: None,
            page: VecDeque::new(),
            done: false,
        })
    }

    fn get(&self, url: &ObjectUrl) -> Result<Box<dyn Read + Send>> {
        let data = self
            .lock()
            .objects
            .get(&key_of(url))
            .map(|object| object.data.clone())
            .ok_or_else(|| PlanError::NotFound(url.to_string()))?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn put(&self, url: &ObjectUrl, size: u64, data: &mut dyn Read) -> Result<u64> {
        let bucket = bucket_root(url).ok_or_else(|| PlanError::MissingBucket(url.to_string()))?;
        if !self.lock().buckets.contains(&bucket) {
            let error = io::Error::new(io::ErrorKind::NotFound, "bucket does not exist");
            return Err(PlanError::Io {
                url: url.to_string(),
                source: error,
            });
        }

        let mut buffer = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        data.read_to_end(&mut buffer)
            .map_err(|e| PlanError::io(url.to_string(), e))?;
        let written = buffer.len() as u64;

        self.lock().objects.insert(
            key_of(url),
            Object {
                data: buffer,
                modified: SystemTime::now(),
            },
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> ObjectUrl {
        ObjectUrl::parse(raw).unwrap()
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert("https://mem.local/bucket/a.txt", "aaaaa").unwrap();
        store.insert("https://mem.local/bucket/a/b.txt", "bbb").unwrap();
        store.insert("https://mem.local/bucket/z.txt", "z").unwrap();
        store
    }

    #[test]
    fn test_stat_object_prefix_and_bucket() {
        let store = store();
        let object = store.stat(&url("https://mem.local/bucket/a.txt")).unwrap();
        assert!(object.kind.is_file());
        assert_eq!(object.size, 5);

        assert!(store.stat(&url("https://mem.local/bucket/a")).unwrap().kind.is_dir());
        assert!(store.stat(&url("https://mem.local/bucket")).unwrap().kind.is_dir());
        assert!(store.stat(&url("https://mem.local/")).unwrap().kind.is_dir());
        assert!(store
            .stat(&url("https://mem.local/bucket/nope"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_recursive_listing_in_key_order() {
        let store = store();
        let paths: Vec<String> = store
            .list(&url("https://mem.local/bucket/"), true)
            .map(|e| e.unwrap().path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "https://mem.local/bucket/a.txt",
                "https://mem.local/bucket/a/b.txt",
                "https://mem.local/bucket/z.txt",
            ]
        );
    }

    #[test]
    fn test_shallow_listing_collapses_prefixes() {
        let store = store();
        let entries: Vec<Entry> = store
            .list(&url("https://mem.local/bucket"), false)
            .map(Result::unwrap)
            .collect();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "https://mem.local/bucket/a.txt",
                "https://mem.local/bucket/a/",
                "https://mem.local/bucket/z.txt",
            ]
        );
        assert!(entries[1].kind.is_dir());
    }

    #[test]
    fn test_listing_spans_several_pages() {
        let store = MemoryStore::new();
        for i in 0..PAGE_SIZE * 2 + 5 {
            store
                .insert(&format!("https://mem.local/bucket/deep/{i:04}.txt"), "x")
                .unwrap();
        }
        store.insert("https://mem.local/bucket/top.txt", "t").unwrap();

        let recursive: Vec<String> = store
            .list(&url("https://mem.local/bucket/"), true)
            .map(|e| e.unwrap().path)
            .collect();
        assert_eq!(recursive.len(), PAGE_SIZE * 2 + 6);
        assert!(recursive.windows(2).all(|pair| pair[0] < pair[1]));

        let shallow: Vec<String> = store
            .list(&url("https://mem.local/bucket/"), false)
            .map(|e| e.unwrap().path)
            .collect();
        assert_eq!(
            shallow,
            vec!["https://mem.local/bucket/deep/", "https://mem.local/bucket/top.txt"]
        );
    }

    #[test]
    fn test_listing_is_read_page_by_page() {
        let store = MemoryStore::new();
        store.insert("https://mem.local/bucket/a.txt", "a").unwrap();
        let listing = store.list(&url("https://mem.local/bucket/"), true);

        store.insert("https://mem.local/bucket/b.txt", "b").unwrap();
        let paths: Vec<String> = listing.map(|e| e.unwrap().path).collect();
        assert_eq!(
            paths,
            vec!["https://mem.local/bucket/a.txt", "https://mem.local/bucket/b.txt"]
        );
    }

    #[test]
    fn test_injected_failure_does_not_stop_listing() {
        let store = store();
        store.fail_listing_at("https://mem.local/bucket/a/b.txt");
        let events: Vec<Result<Entry>> = store
            .list(&url("https://mem.local/bucket/"), true)
            .collect();
        assert_eq!(events.len(), 3);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(PlanError::Listing { .. })));
        assert!(events[2].is_ok());
    }

    #[test]
    fn test_put_requires_bucket() {
        let store = MemoryStore::new();
        let target = url("https://mem.local/missing/a.txt");
        assert!(store.put(&target, 1, &mut "x".as_bytes()).is_err());

        store.make_bucket("https://mem.local/missing").unwrap();
        assert_eq!(store.put(&target, 1, &mut "x".as_bytes()).unwrap(), 1);
        assert_eq!(store.read("https://mem.local/missing/a.txt"), Some(b"x".to_vec()));
    }

    #[test]
    fn test_listing_missing_bucket_fails() {
        let store = MemoryStore::new();
        let events: Vec<Result<Entry>> = store
            .list(&url("https://mem.local/nobucket/"), true)
            .collect();
        assert_eq!(events.len(), 1);
        assert!(events[0].as_ref().unwrap_err().is_not_found());
    }
}
