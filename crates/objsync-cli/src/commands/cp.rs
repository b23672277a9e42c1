use std::sync::Arc;

use anyhow::Context;
use objsync_core::plan::{CopyPlanner, check_copy_syntax};
use objsync_core::storage::{Router, Storage};
use objsync_core::transfer::{TransferExecutor, TransferSummary};
use tracing::debug;

use super::CommandOptions;
use crate::output::Printer;

pub struct Cp;

impl Cp {
    /// Copy every source to the target, the last of `args`
    pub fn execute(args: &[String], options: &CommandOptions<'_>) -> anyhow::Result<()> {
        let settings = options.settings(false)?;
        let (target, sources) = args
            .split_last()
            .context("cp needs at least one source and a target")?;

        let storage: Arc<dyn Storage> = Arc::new(Router::new());
        let shape = check_copy_syntax(&*storage, sources, target)
            .context("Invalid copy arguments")?;
        debug!(?shape, "copy arguments accepted");

        let planner = CopyPlanner::new(Arc::clone(&storage));
        let executor = TransferExecutor::new(storage, settings.dry_run);
        let printer = Printer::new(settings);
        let mut summary = TransferSummary::default();

        for item in planner.plan_shape(shape, sources, target) {
            let copied = item.and_then(|instruction| {
                executor.copy(&instruction).map(|bytes| (instruction, bytes))
            });
            match copied {
                Ok((instruction, bytes)) => {
                    printer.copied(&instruction, bytes);
                    summary.record_copy(bytes);
                }
                Err(e) => {
                    printer.error(&e);
                    summary.record_error(e);
                }
            }
        }

        printer.summary(&summary);
        if !summary.is_success() {
            anyhow::bail!("{} object(s) could not be copied", summary.errors.len());
        }
        Ok(())
    }
}
