//! # CLI Argument Definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "sdeck")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Resolve a deployment environment into a Typesense service topology")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Target environment: dev, stage or prod
    #[arg(short, long, env = "SDECK_ENV", global = true)]
    pub env: Option<String>,

    /// Configuration file (default: ./sdeck.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synthesize the resource template of the environment
    Synth {
        /// Write the template to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Summarize topology, placement and exposed ingress
    Plan {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the output keys the environment publishes, without provisioning
    Outputs {
        /// Print the keys as a JSON array
        #[arg(long)]
        json: bool,
    },
}
