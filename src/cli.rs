use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roscfg")]
#[command(version)]
#[command(about = "Declarative configuration for RouterOS devices", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/roscfg/config.toml)
    #[arg(long, global = true, env = "ROSCFG_CONFIG")]
    pub config: Option<PathBuf>,

    /// State file (default: ~/.local/state/roscfg/state.toml)
    #[arg(long, global = true, env = "ROSCFG_STATE")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change on the device
    Plan(PlanArgs),

    /// Bring the device in line with the config
    Apply(ApplyArgs),

    /// Start tracking an instance that already exists on the device
    Import(ImportArgs),

    /// Show the live state of one instance
    Show(InstanceArgs),

    /// Delete one instance from the device and stop tracking it
    Destroy(DestroyArgs),

    /// List resource kinds, or the properties of one kind
    Kinds {
        /// Kind to describe
        kind: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Plan / Apply
// ============================================================================

#[derive(Parser)]
pub struct PlanArgs {
    /// Only plan one kind or one instance (`kind` or `kind.key`)
    pub target: Option<String>,

    /// Number of parallel device reads
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only apply one kind or one instance (`kind` or `kind.key`)
    pub target: Option<String>,

    /// Dry run - show what would be done
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

// ============================================================================
// Single Instances
// ============================================================================

#[derive(Parser)]
pub struct ImportArgs {
    /// Resource kind, e.g. interface_ethernet
    pub kind: String,

    /// Identity on the device, e.g. ether1
    pub identity: String,

    /// Config key to track it under (defaults to the identity)
    #[arg(short, long)]
    pub key: Option<String>,
}

#[derive(Parser)]
pub struct InstanceArgs {
    /// Resource kind
    pub kind: String,

    /// Identity on the device
    pub identity: String,
}

#[derive(Parser)]
pub struct DestroyArgs {
    /// Resource kind
    pub kind: String,

    /// Identity on the device
    pub identity: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
