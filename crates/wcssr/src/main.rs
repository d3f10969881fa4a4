//! wcssr CLI - server-side rendering for web component wrappers.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "wcssr")]
#[command(about = "Server-side render web component wrappers in compiled React modules")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to wcssr.toml config file
    #[arg(short, long, default_value = "wcssr.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a wcssr.toml in the current directory
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        yes: bool,
    },

    /// Transform a single module and print the result
    Transform {
        /// Compiled module to transform
        file: PathBuf,

        /// Print the generated component declarations as JSX
        #[arg(long)]
        jsx: bool,
    },

    /// Transform every module in a directory
    Build {
        /// Source directory
        src: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
    },

    /// Build, then rebuild modules as they change
    Watch {
        /// Source directory
        src: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Transform { file, jsx } => {
            commands::transform::run(&cli.config, &file, jsx).await?;
        }
        Commands::Build { src, out } => {
            commands::build::run(&cli.config, &src, &out).await?;
        }
        Commands::Watch { src, out } => {
            commands::watch::run(&cli.config, src, out).await?;
        }
    }

    Ok(())
}
