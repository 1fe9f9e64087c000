use clap::{Args, Subcommand, ValueEnum};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::directory::AtletaRepository;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the app settings and client configuration
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Update the app settings
    Set {
        /// Application display name
        #[arg(long)]
        app_name: Option<String>,

        /// Logo URL (or data URL)
        #[arg(long)]
        logo_url: Option<String>,
    },
}

impl ConfigCommand {
    pub async fn run(
        &self,
        repo: &AtletaRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                let app_config = repo.get_config();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&app_config)?);
                    }
                    OutputFormat::Text => {
                        println!("App settings");
                        println!("============\n");
                        println!("appName: {}", app_config.app_name);
                        println!("logoURL: {}", app_config.logo_url);
                        println!();

                        println!("Client");
                        println!("======\n");
                        println!("data_dir: {}", config.data_dir.display());
                        println!("provider: {}", config.resolved_provider());
                        if !config.api_url.is_empty() {
                            println!("api_url: {}", config.api_url);
                        }
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Set { app_name, logo_url } => {
                let mut patch = Map::new();
                if let Some(app_name) = app_name {
                    patch.insert("appName".to_string(), Value::String(app_name.clone()));
                }
                if let Some(logo_url) = logo_url {
                    patch.insert("logoURL".to_string(), Value::String(logo_url.clone()));
                }

                if patch.is_empty() {
                    return Err("nothing to set; pass --app-name or --logo-url".into());
                }

                let updated = repo.update_config(&Value::Object(patch)).await?;
                println!("App settings updated: {}", updated.app_name);
                Ok(())
            }
        }
    }
}
