//! HTTP client for the registry's REST API.
//!
//! One typed method per endpoint. The bearer token is passed explicitly by
//! the caller; this module never reads ambient session state.

use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{
    AppConfig, AppUser, Atleta, LoginRequest, LoginResponse, MeResponse, RegisterRequest,
    RegisterResponse,
};

/// Errors from talking to the remote API.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, bad URL).
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: u16, message: String },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "request failed: {}", e),
            ApiError::Status { status, message } => write!(f, "API {}: {}", status, message),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Http(e)
    }
}

impl ApiError {
    /// True for 404 responses, which several callers treat as "absent"
    /// rather than as a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16()
        )
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(default)]
    pub provider: String,
}

/// Typed client for the registry API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    /// Sends a request and maps non-success statuses to `ApiError::Status`,
    /// using the server's `message` field when the body carries one.
    async fn send(request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };
        let response = Self::send(self.http.post(self.url("/api/auth/login")).json(&body)).await?;
        Ok(response.json().await?)
    }

    pub async fn register(
        &self,
        token: Option<&str>,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ApiError> {
        let builder = self.http.post(self.url("/api/auth/register")).json(request);
        let response = Self::send(Self::authorize(builder, token)).await?;
        Ok(response.json().await?)
    }

    pub async fn me(&self, token: &str) -> Result<AppUser, ApiError> {
        let builder = self.http.get(self.url("/api/auth/me"));
        let response = Self::send(Self::authorize(builder, Some(token))).await?;
        let body: MeResponse = response.json().await?;
        Ok(body.user)
    }

    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let builder = self.http.post(self.url("/api/auth/logout"));
        Self::send(Self::authorize(builder, Some(token))).await?;
        Ok(())
    }

    pub async fn list_atletas(&self, token: Option<&str>) -> Result<Vec<Atleta>, ApiError> {
        let builder = self.http.get(self.url("/api/atletas"));
        let response = Self::send(Self::authorize(builder, token)).await?;
        Ok(response.json().await?)
    }

    pub async fn get_atleta(&self, token: Option<&str>, id: &str) -> Result<Atleta, ApiError> {
        let builder = self.http.get(self.url(&format!("/api/atletas/{}", id)));
        let response = Self::send(Self::authorize(builder, token)).await?;
        Ok(response.json().await?)
    }

    pub async fn create_atleta(
        &self,
        token: Option<&str>,
        atleta: &Atleta,
    ) -> Result<Atleta, ApiError> {
        let builder = self.http.post(self.url("/api/atletas")).json(atleta);
        let response = Self::send(Self::authorize(builder, token)).await?;
        Ok(response.json().await?)
    }

    pub async fn update_atleta(
        &self,
        token: Option<&str>,
        id: &str,
        patch: &Value,
    ) -> Result<Atleta, ApiError> {
        let builder = self
            .http
            .put(self.url(&format!("/api/atletas/{}", id)))
            .json(patch);
        let response = Self::send(Self::authorize(builder, token)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_atleta(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        let builder = self.http.delete(self.url(&format!("/api/atletas/{}", id)));
        Self::send(Self::authorize(builder, token)).await?;
        Ok(())
    }

    pub async fn get_config(&self, token: Option<&str>) -> Result<AppConfig, ApiError> {
        let builder = self.http.get(self.url("/api/config"));
        let response = Self::send(Self::authorize(builder, token)).await?;
        Ok(response.json().await?)
    }

    pub async fn put_config(
        &self,
        token: Option<&str>,
        config: &AppConfig,
    ) -> Result<AppConfig, ApiError> {
        let builder = self.http.put(self.url("/api/config")).json(config);
        let response = Self::send(Self::authorize(builder, token)).await?;
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let response = Self::send(self.http.get(self.url("/api/health"))).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = ApiClient::new("http://localhost:4000");
        assert_eq!(
            client.url("/api/atletas"),
            "http://localhost:4000/api/atletas"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:4000/");
        assert_eq!(client.base_url(), "http://localhost:4000");
        assert_eq!(client.url("/api/health"), "http://localhost:4000/api/health");
    }

    #[test]
    fn test_not_found_helper() {
        let err = ApiError::Status {
            status: 404,
            message: "Atleta nao encontrado".to_string(),
        };
        assert!(err.is_not_found());

        let err = ApiError::Status {
            status: 401,
            message: "x".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
