//! leadbridge - OAuth2 bridge service for the LeadConnector CRM.
//!
//! Main entry point for the leadbridge CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::serve;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// leadbridge - OAuth2 bridge service for the LeadConnector CRM
#[derive(Parser)]
#[command(name = "leadbridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the leadbridge server
    Serve(serve::ServeArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Populate the environment from a .env file when one is present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "leadbridge=debug,leadbridge_oauth=debug,leadbridge_server=debug,leadbridge_config=debug,info"
    } else {
        "leadbridge=info,leadbridge_oauth=info,leadbridge_server=info,warn"
    };

    let file_appender = tracing_appender::rolling::daily("logs", "leadbridge.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "leadbridge=trace,leadbridge_oauth=trace,leadbridge_server=trace,leadbridge_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
    }
}
