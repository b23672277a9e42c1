//! Byte-copy execution of planned instructions
//!
//! Plans decide what to move; this module moves it, one object at a time,
//! and keeps the tallies the CLI reports at the end. There are no retries.

mod executor;
mod reporting;

pub use executor::TransferExecutor;
pub use reporting::TransferReporter;

/// Counters for one copy or mirror run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    /// Objects written (or that would be, in dry-run mode)
    pub copied: usize,
    /// Bytes written
    pub bytes: u64,
    /// One message per failed object or plan error
    pub errors: Vec<String>,
}

impl TransferSummary {
    /// Count one finished transfer
    pub fn record_copy(&mut self, bytes: u64) {
        self.copied += 1;
        self.bytes += bytes;
    }

    /// Count one failure
    pub fn record_error(&mut self, error: impl ToString) {
        self.errors.push(error.to_string());
    }

    /// Whether the run finished without errors
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
