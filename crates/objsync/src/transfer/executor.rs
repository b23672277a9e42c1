//! Single-object transfers

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::location::ObjectUrl;
use crate::mirror::MirrorInstruction;
use crate::plan::CopyInstruction;
use crate::storage::Storage;

/// Performs the GET and PUT behind each instruction
pub struct TransferExecutor {
    storage: Arc<dyn Storage>,
    dry_run: bool,
}

impl TransferExecutor {
    /// Create a new executor
    pub fn new(storage: Arc<dyn Storage>, dry_run: bool) -> Self {
        Self { storage, dry_run }
    }

    /// Copy one object, returning the bytes written
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the target written.
    pub fn copy(&self, instruction: &CopyInstruction) -> Result<u64> {
        self.transfer(&instruction.source.path, instruction.source.size, &instruction.target)
    }

    /// Copy one object to every target still missing it
    ///
    /// Each target succeeds or fails on its own.
    pub fn mirror(&self, instruction: &MirrorInstruction) -> Vec<(ObjectUrl, Result<u64>)> {
        instruction
            .targets
            .iter()
            .map(|target| {
                let result =
                    self.transfer(&instruction.source.path, instruction.source.size, target);
                (target.clone(), result)
            })
            .collect()
    }

    fn transfer(&self, source: &str, size: u64, target: &ObjectUrl) -> Result<u64> {
        if self.dry_run {
            debug!(source, target = %target, size, "dry run, skipping transfer");
            return Ok(size);
        }

        let source_url = ObjectUrl::parse(source)?;
        let mut reader = self.storage.get(&source_url)?;
        let written = self.storage.put(target, size, &mut reader)?;
        info!(source, target = %target, bytes = written, "transferred");
        Ok(written)
    }
}
