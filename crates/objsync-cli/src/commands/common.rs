//! Common types and utilities for command execution

use std::path::Path;

use objsync_core::config::ConfigManager;

/// Global flags as given on the command line
#[allow(clippy::struct_excessive_bools)]
pub struct CommandOptions<'a> {
    /// Preview transfers without executing them
    pub dry_run: bool,
    /// JSON output
    pub json: bool,
    /// Errors only
    pub quiet: bool,
    /// Path to custom config file
    pub config_path: Option<&'a Path>,
    /// Skip loading all config files
    pub no_config: bool,
}

/// Flags and config files combined
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    pub dry_run: bool,
    pub json: bool,
    pub quiet: bool,
    pub force: bool,
}

impl CommandOptions<'_> {
    /// Load config files and OR the command-line flags on top
    pub fn settings(&self, force: bool) -> anyhow::Result<Settings> {
        let config = ConfigManager::load(self.config_path, self.no_config)?;
        let settings = Settings {
            dry_run: self.dry_run || config.dry_run,
            json: self.json || config.json,
            quiet: self.quiet || config.quiet,
            force: force || config.force,
        };
        if settings.json && settings.quiet {
            anyhow::bail!("--json and --quiet cannot be combined");
        }
        Ok(settings)
    }
}
