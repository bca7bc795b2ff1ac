//! Graphweld command-line interface

mod commands;
mod sdl;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Graphweld CLI arguments
#[derive(Parser, Debug)]
#[command(name = "graphweld")]
#[command(about = "Graphweld GraphQL bundle tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump the GraphQL schema as sorted SDL
    DumpSchema(commands::schema::DumpSchemaArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "graphweld_cli=debug,graphweld_core=debug".into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "graphweld_cli=info".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::DumpSchema(args) => commands::schema::execute(args),
    }
}
