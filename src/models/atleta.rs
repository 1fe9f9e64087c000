use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One athlete record.
///
/// Field names follow the wire format used by the registration forms, so
/// every field is a string and tolerates being absent in partial payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Atleta {
    pub id: String,
    pub nome: String,
    pub cpf: String,
    pub nis: String,
    pub data_nascimento: String,
    pub sexo: String,
    pub whatsapp: String,
    pub peso: String,
    pub altura: String,
    pub tamanho_camisa: String,
    pub num_calcado: String,
    pub posicao: String,
    pub pe_dominante: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub endereco: Endereco,
    pub escolar: Escolar,
    pub saude: Saude,
    pub responsavel: Responsavel,
    pub created_at: String,
}

impl Atleta {
    pub fn new(nome: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            ..Self::default()
        }
    }

    /// Fills `id` and `created_at` when absent. `id` is assigned exactly
    /// once; callers must never change it afterwards.
    pub fn ensure_identity(&mut self) {
        if self.id.is_empty() {
            self.id = new_record_id();
        }
        if self.created_at.is_empty() {
            self.created_at = chrono::Utc::now().to_rfc3339();
        }
    }
}

impl fmt::Display for Atleta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.nome)?;
        writeln!(f, "{}", "=".repeat(self.nome.chars().count()))?;
        writeln!(f, "Id: {}", self.id)?;
        if !self.cpf.is_empty() {
            writeln!(f, "CPF: {}", crate::validation::format_cpf(&self.cpf))?;
        }
        if !self.nis.is_empty() {
            writeln!(f, "NIS: {}", crate::validation::format_nis(&self.nis))?;
        }
        if !self.data_nascimento.is_empty() {
            writeln!(f, "Nascimento: {}", self.data_nascimento)?;
        }
        if !self.posicao.is_empty() {
            writeln!(f, "Posicao: {}", self.posicao)?;
        }
        if !self.pe_dominante.is_empty() {
            writeln!(f, "Pe dominante: {}", self.pe_dominante)?;
        }
        Ok(())
    }
}

/// Residential address of an athlete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Endereco {
    pub logradouro: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
    pub cep: String,
}

/// School enrollment data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Escolar {
    pub escola: String,
    pub serie: String,
    pub turno: String,
}

/// Health profile and emergency contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Saude {
    pub restricao: String,
    pub alergia: String,
    pub tipo_sanguineo: String,
    pub contato_emergencia: String,
    pub telefone_emergencia: String,
}

/// Legal guardian.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Responsavel {
    pub nome: String,
    pub cpf: String,
    pub parentesco: String,
}

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 9;

/// Generates a short random base-36 record id.
pub fn new_record_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_CHARSET[rng.random_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Shallow-merges `patch` into `base`: top-level patch fields win, everything
/// else is kept. `id` and `createdAt` from `base` survive the merge when set.
///
/// Non-object inputs fall back to the patch value, matching a full replace.
pub fn merge_record_patch(base: &Value, patch: &Value) -> Value {
    let (Value::Object(base_map), Value::Object(patch_map)) = (base, patch) else {
        return patch.clone();
    };

    let mut merged = base_map.clone();
    for (key, value) in patch_map {
        merged.insert(key.clone(), value.clone());
    }

    for immutable in ["id", "createdAt"] {
        match base_map.get(immutable) {
            Some(Value::String(s)) if !s.is_empty() => {
                merged.insert(immutable.to_string(), Value::String(s.clone()));
            }
            _ => {}
        }
    }

    Value::Object(merged)
}
