//! Skimmer CLI - run the fill/link pipeline over JSON-lines event files

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "skimmer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Skim every event of an input file
    Run {
        /// JSON-lines input events
        #[arg(short, long)]
        input: PathBuf,

        /// JSON-lines output events (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skim configuration (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run each phase with one thread per component
        #[arg(long)]
        parallel: bool,

        /// Log failed events and continue instead of stopping
        #[arg(long)]
        keep_going: bool,
    },

    /// Print the default configuration
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize the collections of an input file
    Inspect {
        /// JSON-lines input events
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            input,
            output,
            config,
            parallel,
            keep_going,
        } => {
            let options = commands::run::RunOptions {
                input,
                output,
                config,
                parallel,
                keep_going,
            };
            commands::run::execute(options)?;
        }
        Commands::Config { output } => {
            commands::config::execute(output)?;
        }
        Commands::Inspect { input } => {
            commands::inspect::execute(input)?;
        }
    }

    Ok(())
}
