//! Strata CLI - Command-line interface for Strata
//!
//! Loads a layout graph from the path notation understood by
//! `strata_graph::GraphBuilder` and prints what the layout engine derives
//! from it: ranks, primary relations, layers and properness.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "strata")]
#[command(author = "Strata Contributors")]
#[command(version)]
#[command(about = "Incremental relative layout for diagram graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with layout settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every vertex with its rank and primary parent
    Ranks {
        /// Graph description file
        file: PathBuf,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the layout neighbourhood of one vertex
    Inspect {
        /// Graph description file
        file: PathBuf,

        /// Vertex name
        name: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Check that every edge spans exactly one rank
    Check {
        /// Graph description file
        file: PathBuf,
    },

    /// Print vertices grouped by rank
    Layers {
        /// Graph description file
        file: PathBuf,
    },

    /// Insert dummy vertices so that the graph becomes proper
    Normalize {
        /// Graph description file
        file: PathBuf,

        /// Also write the resulting snapshot to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the graph and its derived data to JSON
    Export {
        /// Graph description file
        file: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "strata-layout.json")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Ranks { file, json } => commands::ranks(&file, &config, json),
            Commands::Inspect { file, name, json } => {
                commands::inspect(&file, &config, &name, json)
            }
            Commands::Check { file } => commands::check(&file, &config),
            Commands::Layers { file } => commands::layers(&file, &config),
            Commands::Normalize { file, output } => {
                commands::normalize(&file, &config, output.as_deref())
            }
            Commands::Export { file, output } => commands::export(&file, &config, &output),
        }
    });

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
