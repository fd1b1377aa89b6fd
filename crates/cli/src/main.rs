use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "bankrules",
    version,
    about = "Match bank transactions against categorization rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a rule file against a JSON array of transactions
    Run {
        /// Rule file (.toml, or .json)
        #[arg(long)]
        rules: PathBuf,
        #[arg(long)]
        transactions: PathBuf,
        /// Only use rules marked auto_apply
        #[arg(long)]
        auto_apply_only: bool,
    },
    /// Check a rule file for authoring mistakes
    Validate {
        #[arg(long)]
        rules: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays parseable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = match cli.command {
        Command::Run {
            rules,
            transactions,
            auto_apply_only,
        } => commands::run(&rules, &transactions, auto_apply_only)?,
        Command::Validate { rules } => commands::validate(&rules)?,
    };
    println!("{output}");
    Ok(())
}
