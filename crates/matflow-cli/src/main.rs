//! matflow CLI
//!
//! Command-line driver for the sparse matrix multiplication pipeline and
//! its data-producing collaborators.
//!
//! # Commands
//!
//! - `multiply`: run the batch multiplication over two triple files
//! - `produce`: emit a document to a named channel on an adjustable interval
//! - `feed`: poll a geographic feed through the on-disk cache
//!
//! Each command is constructed, run, and torn down independently; there is
//! no shared session state between invocations.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// matflow - key-partitioned sparse matrix multiplication dataflow
#[derive(Parser)]
#[command(name = "matflow")]
#[command(version)]
#[command(about = "Sparse matrix multiplication dataflow and data-feed tools")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Multiply two sparse matrices given as row,col,value triple files
    Multiply(commands::multiply::MultiplyArgs),
    /// Run the interval feed producer with stdin as its control channel
    Produce(commands::produce::ProduceArgs),
    /// Poll a geographic feed and print typed records as JSON lines
    Feed(commands::feed::FeedArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Multiply(args) => commands::multiply::handle_multiply(args),
        Commands::Produce(args) => commands::produce::handle_produce(args).await,
        Commands::Feed(args) => commands::feed::handle_feed(args).await,
    };

    std::process::exit(exit_code);
}
