//! meshcheck CLI library

pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// meshcheck - validate service mesh routing configuration
#[derive(Parser, Debug)]
#[command(name = "meshcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (YAML or JSON)
    #[arg(long, env = "MESHCHECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check DestinationRule hosts and subsets against an inventory
    Validate(commands::validate::ValidateArgs),
    /// Report the traffic-management features each VirtualService uses
    Classify(commands::classify::ClassifyArgs),
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        let config = config::load_config(self.config.as_deref())?;
        match self.command {
            Commands::Validate(args) => commands::validate::run(args, &config),
            Commands::Classify(args) => commands::classify::run(args, &config),
        }
    }
}
