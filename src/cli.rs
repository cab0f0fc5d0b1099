//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Tracerlink - tracer links and click analytics for résumé exports
#[derive(Parser)]
#[command(name = "tracerlink")]
#[command(version)]
#[command(about = "Tracer links and click analytics for résumé exports", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Check whether the public base URL is reachable and print the report as JSON
    Readiness {
        /// Bypass the readiness cache
        #[arg(long)]
        force: bool,

        /// Origin to fall back to when tracer.public_base_url is not set
        #[arg(long)]
        origin: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,
    },
}
