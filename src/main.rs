use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use estrelas::commands::{AtletaCommand, AuthCommand, ConfigCommand};
use estrelas::config::Config;

#[derive(Parser)]
#[command(name = "estrelas")]
#[command(version)]
#[command(about = "Athlete registry for the Estrelas do Norte project", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage athlete records
    Atleta(AtletaCommand),

    /// Log in, log out, and manage users
    Auth(AuthCommand),

    /// Show and change app settings
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Background sync warnings land on stderr; quiet by default.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "estrelas=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration; the provider choice is fixed from here on.
    let config = Config::load(cli.config)?;
    let repo = config.repository();

    match cli.command {
        Some(Commands::Atleta(cmd)) => cmd.run(&repo).await?,
        Some(Commands::Auth(cmd)) => cmd.run(&repo).await?,
        Some(Commands::Config(cmd)) => cmd.run(&repo, &config).await?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
