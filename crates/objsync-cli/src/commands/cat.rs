use std::io::{self, Write};

use anyhow::Context;
use objsync_core::ObjectUrl;
use objsync_core::storage::{Router, Storage};
use tracing::debug;

pub struct Cat;

impl Cat {
    /// Write every source to stdout, one after another
    ///
    /// A reader that goes away early (`objsync cat big | head`) ends the
    /// command successfully.
    pub fn execute(sources: &[String]) -> anyhow::Result<()> {
        let storage = Router::new();
        let stdout = io::stdout();
        let mut out = stdout.lock();

        for source in sources {
            let url = ObjectUrl::parse(source).context("Invalid source")?;
            let entry = storage
                .stat(&url)
                .with_context(|| format!("Unable to read ‘{source}’"))?;
            if entry.kind.is_dir() {
                anyhow::bail!("‘{source}’ is a directory");
            }

            let mut reader = storage
                .get(&url)
                .with_context(|| format!("Unable to read ‘{source}’"))?;
            match io::copy(&mut reader, &mut out) {
                Ok(bytes) => debug!(source, bytes, "written to stdout"),
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("stdout closed");
                    return Ok(());
                }
                Err(e) => return Err(e).with_context(|| format!("Failed to print ‘{source}’")),
            }
        }

        match out.flush() {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                Err(e).context("Failed to flush stdout")
            }
            _ => Ok(()),
        }
    }
}
