//! End-of-run summaries

use std::fmt::Write;

use super::TransferSummary;

/// Formats a [`TransferSummary`] for people
pub struct TransferReporter;

impl TransferReporter {
    /// Generate a summary report
    #[must_use]
    pub fn generate_summary(summary: &TransferSummary, dry_run: bool) -> String {
        let mut output = String::new();
        let verb = if dry_run { "Would copy" } else { "Copied" };

        let _ = writeln!(output, "\n=== Transfer Summary ===");
        let _ = writeln!(output, "{verb}:  {} objects", summary.copied);
        let _ = writeln!(output, "Bytes:   {}", summary.bytes);

        if !summary.errors.is_empty() {
            let _ = writeln!(output, "\nErrors ({}):", summary.errors.len());
            for error in &summary.errors {
                let _ = writeln!(output, "  - {error}");
            }
        }

        if summary.is_success() {
            output.push_str("Status: ✓ Success\n");
        } else {
            output.push_str("Status: ✗ Completed with errors\n");
        }

        output
    }
}
