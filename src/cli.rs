// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "polepole")]
#[command(about = "Progressive delivery for managed container app platforms")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// JSON-lines output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new polepole.yml configuration file
    Init {
        /// App name to seed the template with
        #[arg(long)]
        app: Option<String>,

        /// Image reference to seed the template with
        #[arg(long)]
        image: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Deploy the app and run its rollout plan
    Deploy {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Break a live deploy lock
        #[arg(long)]
        force: bool,
    },

    /// Assign a traffic weight to a revision directly
    Promote {
        /// Revision to assign traffic to
        #[arg(long)]
        revision: String,

        /// Traffic percentage for the revision (0 drains it)
        #[arg(long, default_value_t = 100)]
        weight: u32,

        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Show app provisioning state and endpoint
    Status {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Show recent app logs
    Logs {
        /// Number of lines from the end
        #[arg(long, default_value_t = 100)]
        tail: u32,

        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// List revisions and their traffic weights
    Revisions {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Stop the app by scaling it to zero
    Stop {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Stop every app in the resource group, best-effort
    Cleanup {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },
}
