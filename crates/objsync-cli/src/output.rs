//! Per-object progress lines and the end-of-run summary
//!
//! Text goes to stdout as `‘source’ -> ‘target’`; errors go to stderr. In
//! JSON mode every line on stdout is one self-contained message.

use std::fmt::Display;

use objsync_core::transfer::{TransferReporter, TransferSummary};
use objsync_core::{CopyInstruction, Entry, ObjectUrl};
use serde::Serialize;

use crate::commands::common::Settings;

/// Version tag carried by every JSON message
const MESSAGE_VERSION: &str = "1.0.0";

#[derive(Serialize)]
struct CopyMessage<'a> {
    version: &'static str,
    source: &'a str,
    target: String,
    length: u64,
}

#[derive(Serialize)]
struct MirrorMessage<'a> {
    version: &'static str,
    source: &'a str,
    targets: Vec<String>,
    length: u64,
}

#[derive(Serialize)]
struct ErrorMessage {
    version: &'static str,
    status: &'static str,
    error: String,
}

#[derive(Serialize)]
struct SummaryMessage<'a> {
    version: &'static str,
    status: &'static str,
    copied: usize,
    bytes: u64,
    errors: &'a [String],
}

pub struct Printer {
    settings: Settings,
}

impl Printer {
    pub const fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn copied(&self, instruction: &CopyInstruction, bytes: u64) {
        if self.settings.json {
            self.emit(&CopyMessage {
                version: MESSAGE_VERSION,
                source: &instruction.source.path,
                target: instruction.target.to_string(),
                length: bytes,
            });
        } else if !self.settings.quiet {
            println!(
                "{}‘{}’ -> ‘{}’",
                self.prefix(),
                instruction.source.path,
                instruction.target
            );
        }
    }

    pub fn mirrored(&self, source: &Entry, targets: &[ObjectUrl], bytes: u64) {
        if self.settings.json {
            self.emit(&MirrorMessage {
                version: MESSAGE_VERSION,
                source: &source.path,
                targets: targets.iter().map(ToString::to_string).collect(),
                length: bytes,
            });
        } else if !self.settings.quiet {
            let list = targets
                .iter()
                .map(|target| format!("‘{target}’"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("{}‘{}’ -> [{list}]", self.prefix(), source.path);
        }
    }

    pub fn error(&self, error: &dyn Display) {
        if self.settings.json {
            self.emit(&ErrorMessage {
                version: MESSAGE_VERSION,
                status: "error",
                error: error.to_string(),
            });
        } else {
            eprintln!("objsync: {error}");
        }
    }

    pub fn summary(&self, summary: &TransferSummary) {
        if self.settings.json {
            self.emit(&SummaryMessage {
                version: MESSAGE_VERSION,
                status: if summary.is_success() { "success" } else { "error" },
                copied: summary.copied,
                bytes: summary.bytes,
                errors: &summary.errors,
            });
        } else if !self.settings.quiet {
            print!(
                "{}",
                TransferReporter::generate_summary(summary, self.settings.dry_run)
            );
        }
    }

    fn prefix(&self) -> &'static str {
        if self.settings.dry_run { "[DRY RUN] " } else { "" }
    }

    #[allow(clippy::unused_self)]
    fn emit(&self, message: &impl Serialize) {
        match serde_json::to_string(message) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("objsync: failed to encode message: {e}"),
        }
    }
}
