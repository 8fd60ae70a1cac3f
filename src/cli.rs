use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BlackConfig;

#[derive(Parser)]
#[command(name = "pyfmt-gate", about = "Run black over Python files and report per-file results")]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a pyfmt-gate config file (default: user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log tool invocations to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report files that black would reformat, without changing them
    Check {
        /// Python files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        black: BlackArgs,
    },
    /// Format files in place
    Fix {
        /// Python files to format
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Only report failures, not warnings from successful runs
        #[arg(long)]
        no_warnings: bool,
        #[command(flatten)]
        black: BlackArgs,
    },
    /// Show the resolved configuration
    Config {
        /// Print config path and exit
        #[arg(long)]
        show_path: bool,
    },
}

#[derive(Args)]
pub struct BlackArgs {
    /// black executable to run
    #[arg(long = "black")]
    pub binary: Option<String>,
    /// black config file, passed through as `--config`
    #[arg(long)]
    pub black_config: Option<PathBuf>,
}

impl BlackArgs {
    pub fn apply(self, mut config: BlackConfig) -> BlackConfig {
        if let Some(binary) = self.binary {
            config.binary = binary;
        }
        if let Some(path) = self.black_config {
            config.config = Some(path);
        }
        config
    }
}
