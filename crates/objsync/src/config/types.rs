//! Configuration types

use serde::{Deserialize, Serialize};

/// Settings shared by every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct Config {
    /// Overwrite mirror targets whose size differs
    #[serde(default)]
    pub force: bool,

    /// Plan and report without transferring anything
    #[serde(default)]
    pub dry_run: bool,

    /// Emit one JSON message per line
    #[serde(default)]
    pub json: bool,

    /// Print errors only
    #[serde(default)]
    pub quiet: bool,
}
