//! Configuration file discovery

use std::path::{Path, PathBuf};

use anyhow::bail;
use tracing::debug;

/// Project-local config, usually kept out of version control
pub const LOCAL_CONFIG_NAME: &str = ".objsync.local.toml";
/// Project config
pub const PROJECT_CONFIG_NAME: &str = ".objsync.toml";

/// Config files found, one slot per precedence level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFiles {
    /// `--config` (highest precedence)
    pub cli: Option<PathBuf>,
    /// Nearest `.objsync.local.toml`
    pub local: Option<PathBuf>,
    /// Nearest `.objsync.toml`
    pub project: Option<PathBuf>,
    /// `<config dir>/objsync/config.toml`
    pub global: Option<PathBuf>,
}

/// Config file discovery
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Find every config file that applies to the current directory
    ///
    /// # Errors
    ///
    /// Returns an error if `cli_path` is given but is not a file.
    pub fn discover(cli_path: Option<&Path>) -> anyhow::Result<ConfigFiles> {
        let cwd = std::env::current_dir().ok();
        Self::discover_from(cli_path, cwd.as_deref(), dirs::config_dir().as_deref())
    }

    /// Discovery rooted at explicit directories
    ///
    /// # Errors
    ///
    /// Returns an error if `cli_path` is given but is not a file.
    pub fn discover_from(
        cli_path: Option<&Path>,
        start: Option<&Path>,
        config_dir: Option<&Path>,
    ) -> anyhow::Result<ConfigFiles> {
        let cli = match cli_path {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => bail!("Config file not found: {}", path.display()),
            None => None,
        };

        let files = ConfigFiles {
            cli,
            local: start.and_then(|dir| find_upwards(dir, LOCAL_CONFIG_NAME)),
            project: start.and_then(|dir| find_upwards(dir, PROJECT_CONFIG_NAME)),
            global: config_dir
                .map(|dir| dir.join("objsync").join("config.toml"))
                .filter(|path| path.is_file()),
        };
        debug!(?files, "discovered config files");
        Ok(files)
    }
}

/// Nearest `name` in `start` or one of its ancestors
fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
