//! Storage backends
//!
//! Every backend answers the same four questions: what is at a location
//! (`stat`), what lives below it (`list`), and how to read and write object
//! bytes. Listings are lazy and report their own failures as `Err` items.
//!
//! Listing order contract: a recursive listing yields entries in
//! non-decreasing byte order of their path strings. Directory entries carry a
//! trailing separator, which is what makes the filesystem and object-store
//! orders agree. The mirror engine relies on this to merge listings in a
//! single pass.

mod local;
mod memory;
mod router;

use std::io::Read;

pub use local::LocalFs;
pub use memory::MemoryStore;
pub use router::Router;

use crate::entry::Entry;
use crate::error::Result;
use crate::location::ObjectUrl;

/// Lazy sequence of listed entries or listing errors
pub type EntryIter = Box<dyn Iterator<Item = Result<Entry>> + Send>;

/// A filesystem or object-storage backend
pub trait Storage: Send + Sync {
    /// Describe the node at `url`
    ///
    /// # Errors
    ///
    /// Returns [`crate::PlanError::NotFound`] when nothing exists there.
    fn stat(&self, url: &ObjectUrl) -> Result<Entry>;

    /// Enumerate the nodes below `url`, descending when `recursive` is set
    fn list(&self, url: &ObjectUrl, recursive: bool) -> EntryIter;

    /// Open an object for reading
    fn get(&self, url: &ObjectUrl) -> Result<Box<dyn Read + Send>>;

    /// Write an object of `size` bytes from `data`, returning bytes written
    fn put(&self, url: &ObjectUrl, size: u64, data: &mut dyn Read) -> Result<u64>;
}
