pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

#[derive(Parser)]
#[command(name = "stackup")]
#[command(version)]
#[command(about = "Stack your dev tools effortlessly")]
#[command(long_about = "Install a declared set of developer tools in dependency order, using the platform's package manager, a downloaded installer or your own commands.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install the tools declared in a config file
    Install {
        /// Path to the YAML tool file
        config: PathBuf,

        /// Only install this preset's tools (and their dependencies)
        #[arg(short, long)]
        preset: Option<String>,

        /// Show the install plan without running anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the root, package manager and connectivity checks
        #[arg(long)]
        skip_preflight: bool,

        /// Emit progress as JSON lines instead of styled text
        #[arg(long)]
        json: bool,
    },

    /// Print version information
    Version,

    /// Print an example tool file
    Example,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Install {
                config,
                preset,
                dry_run,
                skip_preflight,
                json,
            } => {
                let options = commands::install::InstallArgs {
                    config,
                    preset,
                    dry_run,
                    skip_preflight,
                    json,
                };
                commands::install::execute(options).await
            }
            Commands::Version => {
                commands::version::execute();
                Ok(())
            }
            Commands::Example => {
                commands::example::execute();
                Ok(())
            }
        }
    }
}
