mod atleta;
mod auth;
mod config_cmd;

pub use atleta::AtletaCommand;
pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
