//! CLI application for stock and sales ledger conversion and reconciliation.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{ask, batch, config, convert, import, summary};

/// stockview - Turn stock and sales ledger exports into a dashboard summary
#[derive(Parser)]
#[command(name = "stockview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single ledger PDF or text export
    Convert(convert::ConvertArgs),

    /// Convert multiple ledger files
    Batch(batch::BatchArgs),

    /// Replace a dataset from a JSON or CSV file
    Import(import::ImportArgs),

    /// Reconcile stored stock and sales into a dashboard summary
    Summary(summary::SummaryArgs),

    /// Ask a question about the stored datasets
    Ask(ask::AskArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Convert(args) => convert::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Import(args) => import::run(args, config_path).await,
        Commands::Summary(args) => summary::run(args, config_path).await,
        Commands::Ask(args) => ask::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
