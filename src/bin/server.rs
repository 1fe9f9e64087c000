//! Estrelas Registry Server
//!
//! REST API for the athlete registry, backed by embedded sqlite.
//!
//! # Configuration
//!
//! Environment variables:
//! - `ESTRELAS_PORT`: Port to listen on (default: 4000)
//! - `ESTRELAS_DB_PATH`: Path to the sqlite database
//!   (default: ~/.local/share/estrelas-server/app.db)
//! - `ESTRELAS_ADMIN_PASSWORD`: Password for the seeded admin account
//!   (default: estrelas2026; used only when the account store is empty)

use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estrelas::server::accounts::DEFAULT_BOOTSTRAP_PASSWORD;
use estrelas::server::{db, router, AppState};

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    port: u16,
    db_path: PathBuf,
    admin_password: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("ESTRELAS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);

        let db_path = std::env::var("ESTRELAS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("estrelas-server")
                    .join("app.db")
            });

        let admin_password = std::env::var("ESTRELAS_ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_BOOTSTRAP_PASSWORD.to_string());

        Self {
            port,
            db_path,
            admin_password,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estrelas=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Database: {}", config.db_path.display());

    let pool = match db::init_db(config.db_path.clone()).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(pool);

    match state.accounts.bootstrap(&config.admin_password).await {
        Ok(Some(account)) => {
            tracing::info!("Seeded bootstrap admin account '{}'", account.nome)
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to seed admin account: {}", e);
            std::process::exit(1);
        }
    }

    match state.sessions.purge_expired().await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Purged {} expired session(s)", n),
        Err(e) => tracing::warn!("Could not purge expired sessions: {}", e),
    }

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
