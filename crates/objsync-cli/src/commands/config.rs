use anyhow::Context;
use objsync_core::config::{ConfigDiscovery, ConfigManager};

use super::CommandOptions;

pub struct Config;

impl Config {
    pub fn execute(options: &CommandOptions<'_>) -> anyhow::Result<()> {
        if options.no_config {
            println!("# config files: skipped (--no-config)");
        } else {
            let files = ConfigDiscovery::discover(options.config_path)?;
            let found = [
                ("global", &files.global),
                ("project", &files.project),
                ("local", &files.local),
                ("cli", &files.cli),
            ];
            for (level, path) in found {
                match path {
                    Some(path) => println!("# {level}: {}", path.display()),
                    None => println!("# {level}: (none)"),
                }
            }
        }

        let config = ConfigManager::load(options.config_path, options.no_config)?;
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        print!("{rendered}");
        Ok(())
    }
}
