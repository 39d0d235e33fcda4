//! Command-line interface for the course assistant.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::output::OutputFormat;

/// Course assistant: study plans from the course database and answers from
/// the PDF handbook corpus.
#[derive(Debug, Parser)]
#[command(name = "coursebot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'c', global = true, help = "Path to a config file")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        short = 'f',
        global = true,
        default_value = "text",
        help = "Output format: text or json"
    )]
    pub format: OutputFormat,

    #[arg(long, short = 'v', global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the index and serve the chat page and API
    Serve(commands::ServeArgs),

    /// Rebuild the vector index from the PDF folder
    Index(commands::IndexArgs),

    /// Answer one message without starting the server
    Ask(commands::AskArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
