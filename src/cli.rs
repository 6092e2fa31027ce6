//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// SYSOCIAL - school administration backend
#[derive(Parser, Debug)]
#[command(name = "sysocial")]
#[command(version)]
#[command(about = "School administration REST backend", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply database migrations and exit
    Migrate,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print a sample configuration file
    Generate {
        /// Write to this path instead of stdout
        output_path: Option<String>,
    },
}

impl Cli {
    /// 未指定子命令时启动服务器
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
