//! Authentication commands for the Estrelas CLI.

use clap::{Args, Subcommand};
use std::io::{self, Write};

use crate::directory::AtletaRepository;
use crate::models::{RegisterRequest, UserRole};

/// Authentication commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Log in with email or username
    Login {
        /// Email or username (prompted when omitted)
        identifier: Option<String>,
    },
    /// Log out and invalidate the server-side session
    Logout,
    /// Register a new user (ADMIN only, except on a fresh server)
    Register {
        /// Display name
        nome: String,
        /// Email address
        email: String,
        /// Role for the new user (admin, tecnico, visualizador)
        #[arg(long)]
        role: Option<String>,
    },
    /// Show authentication status
    Status,
}

impl AuthCommand {
    pub async fn run(&self, repo: &AtletaRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Login { identifier } => login(repo, identifier.clone()).await,
            AuthSubcommand::Logout => logout(repo).await,
            AuthSubcommand::Register { nome, email, role } => {
                register(repo, nome, email, role.as_deref()).await
            }
            AuthSubcommand::Status => status(repo).await,
        }
    }
}

fn prompt(label: &str) -> Result<String, io::Error> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim_end_matches(['\r', '\n']).to_string())
}

async fn login(
    repo: &AtletaRepository,
    identifier: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let identifier = match identifier {
        Some(identifier) => identifier,
        None => prompt("Email or username")?,
    };
    if identifier.is_empty() {
        return Err("identifier cannot be empty".into());
    }

    let password = prompt("Password")?;

    let user = repo.login(&identifier, &password).await?;
    println!("Logged in as {} ({})", user.nome, user.role);
    Ok(())
}

async fn logout(repo: &AtletaRepository) -> Result<(), Box<dyn std::error::Error>> {
    repo.logout().await?;
    println!("Logged out.");
    Ok(())
}

async fn register(
    repo: &AtletaRepository,
    nome: &str,
    email: &str,
    role: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = match role {
        Some(role) => Some(role.parse::<UserRole>()?),
        None => None,
    };

    let password = prompt("Password")?;
    if password.is_empty() {
        return Err("password cannot be empty".into());
    }

    let request = RegisterRequest {
        nome: nome.to_string(),
        email: email.to_string(),
        password,
        role,
    };

    let response = repo.register(&request).await?;
    println!(
        "Registered {} ({})",
        response.user.email, response.user.role
    );
    if response.token.is_some() {
        println!("Session started for the new account.");
    }
    Ok(())
}

async fn status(repo: &AtletaRepository) -> Result<(), Box<dyn std::error::Error>> {
    if repo.session().is_authenticated() {
        let user = repo.session().current_user();
        println!("Logged in as {} <{}> ({})", user.nome, user.email, user.role);
    } else {
        println!("Not logged in.");
    }

    if repo.is_remote_backed() {
        let reachable = repo.api_status().await;
        println!(
            "API: {}",
            if reachable { "reachable" } else { "unreachable" }
        );
    } else {
        println!("Mode: local only (no API configured)");
    }
    Ok(())
}
