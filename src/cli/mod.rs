//! CLI module for SpendGuard
//!
//! # Commands
//!
//! - `serve` - Start the enforcement service
//! - `check` - Validate a config file and print its fleet
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start with the default config and no background cycles
//! spendguard serve --no-scheduler
//!
//! # Validate a config and print it as JSON
//! spendguard check -c fleet.toml --json
//!
//! # Generate shell completions
//! spendguard completions bash > ~/.bash_completion.d/spendguard
//! ```

pub mod check;
pub mod completions;
pub mod config;
pub mod output;
pub mod serve;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// SpendGuard - campaign budget enforcement and dayparting
#[derive(Parser, Debug)]
#[command(
    name = "spendguard",
    version,
    about = "Pauses and resumes ad campaigns against budget ceilings and dayparting windows"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the SpendGuard server
    Serve(ServeArgs),
    /// Validate a configuration file and print its fleet
    Check(CheckArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "spendguard.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "SPENDGUARD_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "SPENDGUARD_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SPENDGUARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Do not run the tick and boundary loops
    #[arg(long)]
    pub no_scheduler: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "spendguard.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "spendguard.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
