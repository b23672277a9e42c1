//! Configuration merging
//!
//! Files are applied lowest precedence first: global, `.objsync.toml`,
//! `.objsync.local.toml`, then `--config`. Booleans use OR semantics, so a
//! setting enabled at any level stays enabled.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use super::discovery::ConfigFiles;
use super::types::Config;

/// Configuration merger
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge every discovered file into one configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed.
    pub fn merge(files: &ConfigFiles) -> anyhow::Result<Config> {
        let mut merged = Config::default();

        for path in [&files.global, &files.project, &files.local, &files.cli]
            .into_iter()
            .flatten()
        {
            Self::merge_into(&mut merged, path)?;
        }

        Ok(merged)
    }

    fn merge_into(base: &mut Config, path: &Path) -> anyhow::Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), ?config, "loaded config file");

        base.force |= config.force;
        base.dry_run |= config.dry_run;
        base.json |= config.json;
        base.quiet |= config.quiet;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_merge_nothing() {
        let config = ConfigMerger::merge(&ConfigFiles::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_merge_is_or_across_levels() {
        let tmp = TempDir::new().unwrap();

        let global = tmp.path().join("global.toml");
        fs::write(&global, "force = true").unwrap();

        let project = tmp.path().join("project.toml");
        fs::write(&project, "force = false\ndry_run = true").unwrap();

        let files = ConfigFiles {
            project: Some(project),
            global: Some(global),
            ..ConfigFiles::default()
        };
        let config = ConfigMerger::merge(&files).unwrap();

        assert!(config.force);
        assert!(config.dry_run);
        assert!(!config.json);
    }

    #[test]
    fn test_merge_reports_parse_errors_with_path() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("broken.toml");
        fs::write(&broken, "force = \"yes\"").unwrap();

        let files = ConfigFiles {
            cli: Some(broken),
            ..ConfigFiles::default()
        };
        let error = ConfigMerger::merge(&files).unwrap_err();
        assert!(error.to_string().contains("broken.toml"));
    }
}
