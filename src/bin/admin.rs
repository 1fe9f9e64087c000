//! Estrelas Admin CLI
//!
//! Administration tool for managing accounts directly in the server
//! database, without going through the API.
//!
//! # Usage
//!
//! ```bash
//! estrelas-admin user add ana@example.com --nome Ana --role tecnico
//! estrelas-admin user list
//! estrelas-admin user set-role ana@example.com admin
//! estrelas-admin user remove ana@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `ESTRELAS_DB_PATH`: Path to the server database
//!   (default: ~/.local/share/estrelas-server/app.db)

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use estrelas::models::UserRole;
use estrelas::server::accounts::AccountStore;
use estrelas::server::db;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "estrelas-admin")]
#[command(version)]
#[command(about = "Estrelas server administration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    User(UserCommand),
}

#[derive(Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand)]
enum UserSubcommand {
    /// Add a new account
    Add {
        /// Account email address
        email: String,
        /// Display name
        #[arg(long, short)]
        nome: String,
        /// Access role (admin, tecnico, visualizador)
        #[arg(long, short, default_value = "visualizador", value_parser = parse_role)]
        role: UserRole,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// List all accounts
    List,
    /// Change an account's role
    SetRole {
        /// Account email address
        email: String,
        /// New role (admin, tecnico, visualizador)
        #[arg(value_parser = parse_role)]
        role: UserRole,
    },
    /// Remove an account
    Remove {
        /// Account email address
        email: String,
    },
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    s.parse()
}

// ============================================================================
// Commands
// ============================================================================

fn db_path() -> PathBuf {
    std::env::var("ESTRELAS_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("estrelas-server")
                .join("app.db")
        })
}

fn prompt_password() -> Result<String, io::Error> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

async fn add_user(
    store: &AccountStore,
    email: String,
    nome: String,
    role: UserRole,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };

    if password.is_empty() {
        eprintln!("Error: password cannot be empty");
        std::process::exit(1);
    }

    let account = store.create(&nome, &email, &password, role).await?;

    println!("Added account: {}", account.email);
    println!("  Nome: {}", account.nome);
    println!("  Role: {}", account.role);

    Ok(())
}

async fn list_users(store: &AccountStore) -> Result<(), Box<dyn std::error::Error>> {
    let accounts = store.list().await?;

    if accounts.is_empty() {
        println!("No accounts registered.");
        return Ok(());
    }

    println!("{:<40} {:<20} {:<15}", "EMAIL", "NOME", "ROLE");
    println!("{}", "-".repeat(75));

    for account in &accounts {
        println!(
            "{:<40} {:<20} {:<15}",
            account.email, account.nome, account.role
        );
    }

    println!();
    println!("Total: {} account(s)", accounts.len());

    Ok(())
}

async fn set_role(
    store: &AccountStore,
    email: String,
    role: UserRole,
) -> Result<(), Box<dyn std::error::Error>> {
    if !store.set_role(&email, role).await? {
        eprintln!("Error: Account '{}' not found", email);
        std::process::exit(1);
    }

    println!("Updated role for {}: {}", email, role);
    Ok(())
}

async fn remove_user(store: &AccountStore, email: String) -> Result<(), Box<dyn std::error::Error>> {
    if !store.remove(&email).await? {
        eprintln!("Error: Account '{}' not found", email);
        std::process::exit(1);
    }

    println!("Removed account: {}", email);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::init_db(db_path()).await?;
    let store = AccountStore::new(pool);

    match cli.command {
        Commands::User(user_cmd) => match user_cmd.command {
            UserSubcommand::Add {
                email,
                nome,
                role,
                password,
            } => add_user(&store, email, nome, role, password).await,
            UserSubcommand::List => list_users(&store).await,
            UserSubcommand::SetRole { email, role } => set_role(&store, email, role).await,
            UserSubcommand::Remove { email } => remove_user(&store, email).await,
        },
    }
}
