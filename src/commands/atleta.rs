use clap::{Args, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::directory::AtletaRepository;
use crate::models::Atleta;
use crate::validation::{format_cpf, validate_cpf, validate_nis};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct AtletaCommand {
    #[command(subcommand)]
    pub command: AtletaSubcommand,
}

#[derive(Subcommand)]
pub enum AtletaSubcommand {
    /// Register a new athlete
    Create {
        /// Athlete's full name
        nome: Option<String>,

        /// CPF number
        #[arg(long)]
        cpf: Option<String>,

        /// NIS number
        #[arg(long)]
        nis: Option<String>,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        nascimento: Option<String>,

        /// Sex (Masculino / Feminino)
        #[arg(long)]
        sexo: Option<String>,

        /// Field position
        #[arg(long)]
        posicao: Option<String>,

        /// Dominant foot
        #[arg(long)]
        pe_dominante: Option<String>,

        /// WhatsApp contact
        #[arg(long)]
        whatsapp: Option<String>,

        /// Read the full record from a JSON file instead of flags
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List all athletes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show an athlete's details
    Show {
        /// Record id
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update an existing athlete
    Update {
        /// Record id
        id: String,

        /// New name
        #[arg(long)]
        nome: Option<String>,

        /// New CPF number
        #[arg(long)]
        cpf: Option<String>,

        /// New NIS number
        #[arg(long)]
        nis: Option<String>,

        /// New birth date (YYYY-MM-DD)
        #[arg(long)]
        nascimento: Option<String>,

        /// New field position
        #[arg(long)]
        posicao: Option<String>,

        /// New dominant foot
        #[arg(long)]
        pe_dominante: Option<String>,

        /// New WhatsApp contact
        #[arg(long)]
        whatsapp: Option<String>,
    },

    /// Delete an athlete
    Delete {
        /// Record id
        id: String,
    },
}

impl AtletaCommand {
    pub async fn run(&self, repo: &AtletaRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AtletaSubcommand::Create {
                nome,
                cpf,
                nis,
                nascimento,
                sexo,
                posicao,
                pe_dominante,
                whatsapp,
                file,
            } => {
                let mut atleta = match file {
                    Some(path) => {
                        let contents = std::fs::read_to_string(path)?;
                        serde_json::from_str::<Atleta>(&contents)?
                    }
                    None => {
                        let nome = nome
                            .as_deref()
                            .ok_or("nome is required (or pass --file)")?;
                        Atleta::new(nome)
                    }
                };

                if let Some(cpf) = cpf {
                    atleta.cpf = cpf.clone();
                }
                if let Some(nis) = nis {
                    atleta.nis = nis.clone();
                }
                if let Some(nascimento) = nascimento {
                    atleta.data_nascimento = nascimento.clone();
                }
                if let Some(sexo) = sexo {
                    atleta.sexo = sexo.clone();
                }
                if let Some(posicao) = posicao {
                    atleta.posicao = posicao.clone();
                }
                if let Some(pe) = pe_dominante {
                    atleta.pe_dominante = pe.clone();
                }
                if let Some(whatsapp) = whatsapp {
                    atleta.whatsapp = whatsapp.clone();
                }

                validate_documents(&atleta.cpf, &atleta.nis)?;
                check_can_edit(repo)?;

                let saved = repo.save_atleta(atleta).await?;
                println!("Registered athlete '{}' (id {})", saved.nome, saved.id);
                Ok(())
            }

            AtletaSubcommand::List { format } => {
                let atletas = repo.get_atletas().await;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&atletas)?);
                    }
                    OutputFormat::Text => {
                        if atletas.is_empty() {
                            println!("No athletes registered.");
                            return Ok(());
                        }

                        println!(
                            "{:<11} {:<30} {:<14} {:<15}",
                            "ID", "NOME", "CPF", "POSICAO"
                        );
                        println!("{}", "-".repeat(72));
                        for atleta in &atletas {
                            println!(
                                "{:<11} {:<30} {:<14} {:<15}",
                                atleta.id,
                                atleta.nome,
                                format_cpf(&atleta.cpf),
                                atleta.posicao
                            );
                        }
                        println!();
                        println!("Total: {} athlete(s)", atletas.len());
                    }
                }
                Ok(())
            }

            AtletaSubcommand::Show { id, format } => {
                let atleta = repo
                    .get_atleta_by_id(id)
                    .await
                    .ok_or_else(|| format!("athlete '{}' not found", id))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&atleta)?)
                    }
                    OutputFormat::Text => print!("{}", atleta),
                }
                Ok(())
            }

            AtletaSubcommand::Update {
                id,
                nome,
                cpf,
                nis,
                nascimento,
                posicao,
                pe_dominante,
                whatsapp,
            } => {
                let mut patch = Map::new();
                set_field(&mut patch, "nome", nome);
                set_field(&mut patch, "cpf", cpf);
                set_field(&mut patch, "nis", nis);
                set_field(&mut patch, "dataNascimento", nascimento);
                set_field(&mut patch, "posicao", posicao);
                set_field(&mut patch, "peDominante", pe_dominante);
                set_field(&mut patch, "whatsapp", whatsapp);

                if patch.is_empty() {
                    return Err("nothing to update; pass at least one field flag".into());
                }

                validate_documents(
                    cpf.as_deref().unwrap_or(""),
                    nis.as_deref().unwrap_or(""),
                )?;
                check_can_edit(repo)?;

                match repo.update_atleta(id, &Value::Object(patch)).await? {
                    Some(updated) => println!("Updated athlete '{}'", updated.nome),
                    None => println!("No local record with id '{}'; nothing changed", id),
                }
                Ok(())
            }

            AtletaSubcommand::Delete { id } => {
                check_can_edit(repo)?;

                if repo.delete_atleta(id).await? {
                    println!("Deleted athlete '{}'", id);
                } else {
                    println!("No local record with id '{}'", id);
                }
                Ok(())
            }
        }
    }
}

fn set_field(patch: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        patch.insert(key.to_string(), Value::String(value.clone()));
    }
}

/// Rejects malformed documents before anything is written.
fn validate_documents(cpf: &str, nis: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !cpf.is_empty() && !validate_cpf(cpf) {
        return Err(format!("CPF '{}' is not valid", cpf).into());
    }
    if !nis.is_empty() && !validate_nis(nis) {
        return Err(format!("NIS '{}' is not valid", nis).into());
    }
    Ok(())
}

/// In remote-backed mode mutations are limited to roles the server would
/// accept anyway; surfacing it here beats a silent failed mirror.
fn check_can_edit(repo: &AtletaRepository) -> Result<(), Box<dyn std::error::Error>> {
    if repo.is_remote_backed() && !repo.session().current_user().role.can_edit() {
        return Err("your role cannot modify records; log in as ADMIN or TECNICO".into());
    }
    Ok(())
}
