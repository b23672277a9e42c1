//! Configuration validation

use super::types::Config;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Check the merged configuration for conflicting settings
    ///
    /// # Errors
    ///
    /// Returns an error if `json` and `quiet` are both enabled.
    pub fn validate(config: &Config) -> anyhow::Result<()> {
        if config.json && config.quiet {
            anyhow::bail!("Conflicting configuration: both json and quiet are enabled");
        }
        Ok(())
    }
}
