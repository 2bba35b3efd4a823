//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Berth - A lazy resource registry
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring the index up to date with the source tree
    Index(IndexArgs),

    /// Show which source files changed since the last index
    Status(StatusArgs),

    /// Resolve a resource and print it as JSON
    Get(GetArgs),

    /// List indexed resources
    List(ListArgs),

    /// Remove the index
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where the index lives.
#[derive(Args, Debug, Clone, Default)]
pub struct IndexPathArgs {
    /// Path of the index document (defaults to .berth/index.json)
    #[arg(long, env = "BERTH_INDEX")]
    pub index: Option<PathBuf>,
}

/// Which source files to scan.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[command(flatten)]
    pub index: IndexPathArgs,

    /// Root directory of the source tree (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Namespace prefix for source names (defaults to the root's name)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Additional source root (repeatable)
    #[arg(long = "external", value_name = "DIR")]
    pub external: Vec<PathBuf>,

    /// Path or glob to skip, relative to the root (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

#[derive(Args)]
pub struct IndexArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

#[derive(Args)]
pub struct GetArgs {
    /// Resource type
    #[arg(value_name = "TYPE")]
    pub module_type: String,

    /// Resource name
    pub name: String,

    /// Print where the resource is declared instead of the resource
    #[arg(long)]
    pub source: bool,

    #[command(flatten)]
    pub index: IndexPathArgs,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only list resources of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub module_type: Option<String>,

    #[command(flatten)]
    pub index: IndexPathArgs,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove a quarantined index
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub index: IndexPathArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
