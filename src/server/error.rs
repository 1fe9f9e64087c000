use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use super::accounts::AccountError;
use super::records::RecordError;

/// API layer errors, rendered as JSON `{ "message": … }` bodies.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound(&'static str),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // One generic message for every authentication failure: bad
            // credentials, missing token, and expired session are not
            // distinguishable from outside.
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Credenciais invalidas ou sessao expirada".to_string(),
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Permissao insuficiente".to_string(),
            ),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} nao encontrado", what)),
            Self::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro interno".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::EmailTaken => {
                ApiError::BadRequest("Email ja cadastrado".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
