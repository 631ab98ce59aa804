use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{CheckCommand, ConfigCommand, HashCommand, VerifyCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "reflights-creds")]
#[command(version)]
#[command(about = "Hash the passwords in the referee lights meet credentials file", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash plaintext passwords and write the credentials file
    Hash(HashCommand),

    /// Report credentials that still hold plaintext passwords
    Check(CheckCommand),

    /// Check a username and password against the hashed file
    Verify(VerifyCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reflights_creds=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Hash(cmd)) => cmd.run(&config)?,
        Some(Commands::Check(cmd)) => cmd.run(&config)?,
        Some(Commands::Verify(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
