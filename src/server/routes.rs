//! HTTP surface of the registry API.
//!
//! Routes are split into a public router (health, login, register) and a
//! protected router whose middleware resolves the bearer token to an
//! account and attaches it to the request. Role checks happen in the
//! mutating handlers; the client-side gating is advisory only.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;

use super::accounts::{Account, AccountStore};
use super::error::ApiError;
use super::records::RecordStore;
use super::sessions::SessionRepository;
use crate::models::{
    AppConfig, Atleta, LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
    UserRole,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    pub sessions: SessionRepository,
    pub records: RecordStore,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            records: RecordStore::new(pool),
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register));

    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/atletas", get(list_atletas).post(create_atleta))
        .route(
            "/api/atletas/{id}",
            get(get_atleta).put(update_atleta).delete(delete_atleta),
        )
        .route("/api/config", get(get_config).put(put_config))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(public).merge(protected).with_state(state)
}

/// Extracts the bearer token from an Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Authentication middleware: resolves the token and forwards the account
/// as a request extension. Every failure mode is the same 401.
async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return ApiError::Unauthorized.into_response();
    };

    match state.sessions.resolve(token).await {
        Ok(Some(account)) => {
            request.extensions_mut().insert(account);
            next.run(request).await
        }
        Ok(None) => ApiError::Unauthorized.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    provider: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        provider: "sqlite",
    })
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state
        .accounts
        .verify(&body.identifier, &body.password)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token = state.sessions.create(&account.id).await?;

    Ok(Json(LoginResponse {
        token,
        user: account.to_user(),
    }))
}

/// Creates an account. Normally restricted to an authenticated ADMIN; when
/// the store is empty the first registration is open and the created user
/// becomes ADMIN and receives a session token.
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let bootstrap = state.accounts.count().await? == 0;

    if !bootstrap {
        let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
        let caller = state
            .sessions
            .resolve(token)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        if !caller.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
    }

    if body.nome.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "nome, email e senha sao obrigatorios".to_string(),
        ));
    }

    let role = if bootstrap {
        UserRole::Admin
    } else {
        body.role.unwrap_or_default()
    };

    let account = state
        .accounts
        .create(body.nome.trim(), body.email.trim(), &body.password, role)
        .await?;

    let token = if bootstrap {
        Some(state.sessions.create(&account.id).await?)
    } else {
        None
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            token,
            user: account.to_user(),
        }),
    ))
}

async fn me(Extension(account): Extension<Account>) -> Json<MeResponse> {
    Json(MeResponse {
        user: account.to_user(),
    })
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    // The middleware guarantees the token is present and valid here.
    if let Some(token) = bearer_token(&headers) {
        state.sessions.delete(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_atletas(State(state): State<AppState>) -> Result<Json<Vec<Atleta>>, ApiError> {
    Ok(Json(state.records.list().await?))
}

async fn get_atleta(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Atleta>, ApiError> {
    state
        .records
        .get(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Atleta"))
}

async fn create_atleta(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(atleta): Json<Atleta>,
) -> Result<(StatusCode, Json<Atleta>), ApiError> {
    if !account.role.can_edit() {
        return Err(ApiError::Forbidden);
    }
    if atleta.nome.trim().is_empty() {
        return Err(ApiError::BadRequest("nome e obrigatorio".to_string()));
    }

    let stored = state.records.upsert(atleta).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn update_atleta(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Atleta>, ApiError> {
    if !account.role.can_edit() {
        return Err(ApiError::Forbidden);
    }

    state
        .records
        .merge_update(&id, &patch)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Atleta"))
}

async fn delete_atleta(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !account.role.can_edit() {
        return Err(ApiError::Forbidden);
    }

    if state.records.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Atleta"))
    }
}

async fn get_config(State(state): State<AppState>) -> Result<Json<AppConfig>, ApiError> {
    Ok(Json(state.records.get_config().await?))
}

async fn put_config(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(patch): Json<Value>,
) -> Result<Json<AppConfig>, ApiError> {
    if !account.role.is_admin() {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(state.records.put_config(&patch).await?))
}
