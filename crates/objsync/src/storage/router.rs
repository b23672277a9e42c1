//! Dispatch locations to the backend that serves them

use std::collections::HashMap;
use std::io::Read;
use std::iter;
use std::sync::Arc;

use super::{EntryIter, LocalFs, Storage};
use crate::entry::Entry;
use crate::error::{PlanError, Result};
use crate::location::ObjectUrl;

/// Storage that sends local paths to [`LocalFs`] and remote URLs to the
/// storage registered for their host
#[derive(Default)]
pub struct Router {
    local: LocalFs,
    remotes: HashMap<String, Arc<dyn Storage>>,
}

impl Router {
    /// A router serving only the local filesystem
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `host` (with port, if any) from `storage`
    #[must_use]
    pub fn with_remote(mut self, host: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        self.remotes.insert(host.into(), storage);
        self
    }

    fn resolve(&self, url: &ObjectUrl) -> Result<&dyn Storage> {
        if !url.is_remote() {
            return Ok(&self.local);
        }
        self.remotes
            .get(url.host())
            .map(|storage| &**storage)
            .ok_or_else(|| PlanError::UnsupportedBackend(url.host().to_string()))
    }
}

impl Storage for Router {
    fn stat(&self, url: &ObjectUrl) -> Result<Entry> {
        self.resolve(url)?.stat(url)
    }

    fn list(&self, url: &ObjectUrl, recursive: bool) -> EntryIter {
        match self.resolve(url) {
            Ok(storage) => storage.list(url, recursive),
            Err(e) => Box::new(iter::once(Err(e))),
        }
    }

    fn get(&self, url: &ObjectUrl) -> Result<Box<dyn Read + Send>> {
        self.resolve(url)?.get(url)
    }

    fn put(&self, url: &ObjectUrl, size: u64, data: &mut dyn Read) -> Result<u64> {
        self.resolve(url)?.put(url, size, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_local_and_registered_remote() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "abc").unwrap();

        let store = Arc::new(MemoryStore::new());
        store.insert("https://mem.local/bucket/b.txt", "bb").unwrap();
        let router = Router::new().with_remote("mem.local", store);

        let local = ObjectUrl::parse(tmp.path().join("a.txt").to_str().unwrap()).unwrap();
        assert_eq!(router.stat(&local).unwrap().size, 3);

        let remote = ObjectUrl::parse("https://mem.local/bucket/b.txt").unwrap();
        assert_eq!(router.stat(&remote).unwrap().size, 2);
    }

    #[test]
    fn test_unknown_host_is_unsupported() {
        let router = Router::new();
        let remote = ObjectUrl::parse("https://s3.example.com/bucket/key").unwrap();

        assert!(matches!(
            router.stat(&remote),
            Err(PlanError::UnsupportedBackend(ref host)) if host == "s3.example.com"
        ));
        let events: Vec<Result<Entry>> = router.list(&remote, true).collect();
        assert!(matches!(events[..], [Err(PlanError::UnsupportedBackend(_))]));
    }
}
