//! CLI that turns invoice PDFs into a journal-ledger CSV.

mod commands;
mod drive;
mod output;
mod source;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, config, models, process};

/// Invoice PDFs to journal-ledger CSV
#[derive(Parser)]
#[command(name = "shiwake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn every PDF in a folder into a ledger CSV
    Batch(batch::BatchArgs),

    /// Process a single PDF or image
    Process(process::ProcessArgs),

    /// Manage OCR models
    Models(models::ModelsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Models(args) => models::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
