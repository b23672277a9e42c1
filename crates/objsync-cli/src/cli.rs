use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Copy and mirror objects between local filesystems and object storage
///
/// Sources ending in `...` are expanded recursively.
#[derive(Parser, Debug)]
#[command(name = "objsync")]
#[command(about, long_about = None, version)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Plan and report without transferring anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print one JSON message per line
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Print errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use specific config file
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Ignore all config files
    #[arg(long, global = true, conflicts_with = "config")]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy files and objects; the last argument is the target
    Cp {
        /// SOURCE... TARGET
        #[arg(required = true, num_args = 2.., value_name = "SOURCE... TARGET")]
        args: Vec<String>,
    },

    /// Bring target directories up to date with a source directory
    ///
    /// `dir/` mirrors the contents of `dir`; `dir` and `dir/...` recreate
    /// `dir` itself under each target.
    Mirror {
        /// Source directory
        source: String,

        /// Target directories
        #[arg(required = true)]
        targets: Vec<String>,

        /// Overwrite target objects whose size differs
        #[arg(short, long)]
        force: bool,
    },

    /// Print files and objects to standard output
    Cat {
        /// Sources, printed in the order given
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Show the effective configuration and where it came from
    Config,
}
