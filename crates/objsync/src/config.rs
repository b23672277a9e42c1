//! Configuration handling
//!
//! Settings come from up to four TOML files, found and merged in a fixed
//! precedence order, then validated as a whole. Command-line flags are ORed
//! on top by the CLI.

mod discovery;
mod merge;
mod types;
mod validation;

use std::path::Path;

pub use discovery::{ConfigDiscovery, ConfigFiles};
pub use merge::ConfigMerger;
pub use types::Config;
pub use validation::ConfigValidator;

/// Loads the effective configuration
pub struct ConfigManager;

impl ConfigManager {
    /// Discover, merge and validate configuration files
    ///
    /// With `no_config` every file is skipped and the defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `--config` file is missing, or if a
    /// file cannot be read, parsed or fails validation.
    pub fn load(cli_config_path: Option<&Path>, no_config: bool) -> anyhow::Result<Config> {
        if no_config {
            return Ok(Config::default());
        }

        let files = ConfigDiscovery::discover(cli_config_path)?;
        let merged = ConfigMerger::merge(&files)?;
        ConfigValidator::validate(&merged)?;

        Ok(merged)
    }
}
