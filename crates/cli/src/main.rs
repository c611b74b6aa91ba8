use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
use commands::{cvss::CvssArgs, scan::ScanCommand};

#[derive(Parser)]
#[command(name = "solaudit")]
#[command(about = "Pattern-based Solidity vulnerability scanner with CVSS scoring")]
#[command(version)]
struct Cli {
    /// Emit engine tracing to stderr (RUST_LOG overrides the level).
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Scan {
        #[command(subcommand)]
        subcommand: ScanCommand,
    },

    /// Parse and score a CVSS v3.1 vector string.
    Cvss(CvssArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "solaudit_engine=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Scan { subcommand } => subcommand.execute(),
        Commands::Cvss(args) => commands::cvss::execute(&args),
    }
}
