//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, cond::CondCommands, event::EventCommands, init::InitArgs,
    mtype::MtypeCommands, tree::TreeCommands, unit::UnitCommands, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "plantree")]
#[command(author, version, about = "Equipment hierarchy and maintenance planning")]
#[command(long_about = "Edit a plant's equipment tree, maintenance type catalog, unit assignment ledger and node conditions, kept as YAML in a .plantree/ workspace.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .plantree/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace
    Init(InitArgs),

    /// Check catalogs, tree and ledger for broken references
    Validate(ValidateArgs),

    /// Equipment tree queries
    #[command(subcommand)]
    Tree(TreeCommands),

    /// Maintenance type catalog of a part model
    #[command(subcommand)]
    Mtype(MtypeCommands),

    /// Unit assignments and slot resolution
    #[command(subcommand)]
    Unit(UnitCommands),

    /// Node conditions
    #[command(subcommand)]
    Cond(CondCommands),

    /// Maintenance events
    #[command(subcommand)]
    Event(EventCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (tree for show, table for lists)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
