use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level of an authenticated user.
///
/// The server enforces these; clients only use them to decide which actions
/// to offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Tecnico,
    #[default]
    Visualizador,
}

impl UserRole {
    /// True for roles allowed to create, edit, and delete athletes.
    pub fn can_edit(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Tecnico)
    }

    /// True for the role allowed to manage accounts and app settings.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Tecnico => "TECNICO",
            UserRole::Visualizador => "VISUALIZADOR",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "TECNICO" => Ok(UserRole::Tecnico),
            "VISUALIZADOR" => Ok(UserRole::Visualizador),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User summary carried in sessions and API responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppUser {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub role: UserRole,
}

impl AppUser {
    /// Empty read-only user, returned when no session exists.
    pub fn placeholder() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AppUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nome: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub user: AppUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: AppUser,
}
