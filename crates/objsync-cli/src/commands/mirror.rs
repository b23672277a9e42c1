use std::sync::Arc;

use anyhow::Context;
use objsync_core::mirror::mirror;
use objsync_core::plan::check_mirror_syntax;
use objsync_core::storage::{Router, Storage};
use objsync_core::transfer::{TransferExecutor, TransferSummary};

use super::CommandOptions;
use crate::output::Printer;

pub struct Mirror;

impl Mirror {
    /// Bring every target up to date with `source`
    pub fn execute(
        source: &str,
        targets: &[String],
        force: bool,
        options: &CommandOptions<'_>,
    ) -> anyhow::Result<()> {
        let settings = options.settings(force)?;

        let storage: Arc<dyn Storage> = Arc::new(Router::new());
        check_mirror_syntax(&*storage, source, targets).context("Invalid mirror arguments")?;

        let executor = TransferExecutor::new(Arc::clone(&storage), settings.dry_run);
        let printer = Printer::new(settings);
        let mut summary = TransferSummary::default();

        for item in mirror(storage, source, targets, settings.force) {
            let instruction = match item {
                Ok(instruction) => instruction,
                Err(e) => {
                    printer.error(&e);
                    summary.record_error(e);
                    continue;
                }
            };

            let mut done = Vec::with_capacity(instruction.targets.len());
            let mut bytes = 0;
            for (target, result) in executor.mirror(&instruction) {
                match result {
                    Ok(written) => {
                        summary.record_copy(written);
                        bytes = written;
                        done.push(target);
                    }
                    Err(e) => {
                        printer.error(&e);
                        summary.record_error(e);
                    }
                }
            }
            if !done.is_empty() {
                printer.mirrored(&instruction.source, &done, bytes);
            }
        }

        printer.summary(&summary);
        if !summary.is_success() {
            anyhow::bail!("{} mirror error(s)", summary.errors.len());
        }
        Ok(())
    }
}
