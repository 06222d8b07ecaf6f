//! Kindling CLI library

pub mod commands;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};

/// Kindling - multi-node Kubernetes clusters in containers
#[derive(Parser, Debug)]
#[command(name = "kindling")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Default and validate a cluster configuration file
    Validate(commands::validate::ValidateArgs),
    /// Print a cluster configuration file with every default filled in
    Defaults(commands::defaults::DefaultsArgs),
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Validate(args) => commands::validate::run(args),
            Commands::Defaults(args) => commands::defaults::run(args),
        }
    }
}
