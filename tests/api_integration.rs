//! Integration tests for the HTTP API
//!
//! These tests exercise the API endpoints using tower::ServiceExt::oneshot()
//! without starting a real server or requiring network access.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use estrelas::server::accounts::DEFAULT_BOOTSTRAP_PASSWORD;
use estrelas::server::{db, router, AppState};

/// Create a bootstrapped app backed by a temp database
async fn test_app(temp_dir: &std::path::Path) -> (Router, AppState) {
    let pool = db::init_db(temp_dir.join("test.db")).await.unwrap();
    let state = AppState::new(pool);
    state
        .accounts
        .bootstrap(DEFAULT_BOOTSTRAP_PASSWORD)
        .await
        .unwrap();
    (router(state.clone()), state)
}

/// Create an app over an empty account store (no bootstrap seed)
async fn empty_app(temp_dir: &std::path::Path) -> Router {
    let pool = db::init_db(temp_dir.join("test.db")).await.unwrap();
    router(AppState::new(pool))
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in as the bootstrap admin and return the bearer token
async fn admin_token(app: &Router) -> String {
    let req = send_json(
        "POST",
        "/api/auth/login",
        None,
        &json!({"identifier": "admin", "password": "estrelas2026"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;

    let resp = app.oneshot(get("/api/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["provider"], "sqlite");
}

#[tokio::test]
async fn test_bootstrap_admin_can_log_in() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;

    let token = admin_token(&app).await;
    assert!(!token.is_empty());

    let resp = app
        .oneshot(get("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["user"]["role"], "ADMIN");
    assert_eq!(json["user"]["nome"], "admin");
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;

    let req = send_json(
        "POST",
        "/api/auth/login",
        None,
        &json!({"identifier": "admin", "password": "wrong"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unknown user gets the same answer.
    let req = send_json(
        "POST",
        "/api/auth/login",
        None,
        &json!({"identifier": "nobody", "password": "estrelas2026"}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;

    let resp = app.clone().oneshot(get("/api/atletas", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(get("/api/atletas", Some("garbage-token")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;
    let token = admin_token(&app).await;

    let req = send_json("POST", "/api/auth/logout", Some(&token), &json!({}));
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.oneshot(get("/api/auth/me", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_atleta_crud() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;
    let token = admin_token(&app).await;

    // Create
    let req = send_json(
        "POST",
        "/api/atletas",
        Some(&token),
        &json!({"nome": "Joao", "posicao": "Goleiro"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 9);
    assert!(!created["createdAt"].as_str().unwrap().is_empty());

    // List
    let resp = app
        .clone()
        .oneshot(get("/api/atletas", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list = body_json(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Partial update merges; untouched fields survive
    let req = send_json(
        "PUT",
        &format!("/api/atletas/{}", id),
        Some(&token),
        &json!({"peso": "45"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["peso"], "45");
    assert_eq!(updated["nome"], "Joao");
    assert_eq!(updated["posicao"], "Goleiro");
    assert_eq!(updated["id"], id.as_str());

    // Get
    let resp = app
        .clone()
        .oneshot(get(&format!("/api/atletas/{}", id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Delete
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/atletas/{}", id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(get(&format!("/api/atletas/{}", id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_atleta_is_404() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;
    let token = admin_token(&app).await;

    let resp = app
        .clone()
        .oneshot(get("/api/atletas/missing-id", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Atleta nao encontrado");

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/atletas/missing-id")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_visualizador_is_read_only() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;
    let token = admin_token(&app).await;

    // Admin registers a viewer account
    let req = send_json(
        "POST",
        "/api/auth/register",
        Some(&token),
        &json!({"nome": "Vera", "email": "vera@example.com", "password": "pw"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered = body_json(resp).await;
    assert_eq!(registered["user"]["role"], "VISUALIZADOR");
    assert!(registered["token"].is_null());

    // Viewer logs in
    let req = send_json(
        "POST",
        "/api/auth/login",
        None,
        &json!({"identifier": "vera@example.com", "password": "pw"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let viewer_token = body_json(resp).await["token"].as_str().unwrap().to_string();

    // Reads are allowed
    let resp = app
        .clone()
        .oneshot(get("/api/atletas", Some(&viewer_token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Mutations are not
    let req = send_json(
        "POST",
        "/api/atletas",
        Some(&viewer_token),
        &json!({"nome": "Joao"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = send_json(
        "PUT",
        "/api/config",
        Some(&viewer_token),
        &json!({"appName": "X"}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_requires_admin() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;
    let token = admin_token(&app).await;

    // Register a TECNICO account
    let req = send_json(
        "POST",
        "/api/auth/register",
        Some(&token),
        &json!({"nome": "Tadeu", "email": "tadeu@example.com", "password": "pw", "role": "TECNICO"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The tecnico cannot register users
    let req = send_json(
        "POST",
        "/api/auth/login",
        None,
        &json!({"identifier": "tadeu@example.com", "password": "pw"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    let tecnico_token = body_json(resp).await["token"].as_str().unwrap().to_string();

    let req = send_json(
        "POST",
        "/api/auth/register",
        Some(&tecnico_token),
        &json!({"nome": "X", "email": "x@example.com", "password": "pw"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // No token at all on a populated store
    let req = send_json(
        "POST",
        "/api/auth/register",
        None,
        &json!({"nome": "X", "email": "x2@example.com", "password": "pw"}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bootstrap_first_user_registration() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let app = empty_app(temp_dir.path()).await;

    // First registration on an empty store needs no token and yields ADMIN
    // plus a session token.
    let req = send_json(
        "POST",
        "/api/auth/register",
        None,
        &json!({"nome": "Fundadora", "email": "f@example.com", "password": "pw"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert_eq!(json["user"]["role"], "ADMIN");
    let token = json["token"].as_str().unwrap();

    let resp = app
        .clone()
        .oneshot(get("/api/auth/me", Some(token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The window closes after the first account exists.
    let req = send_json(
        "POST",
        "/api/auth/register",
        None,
        &json!({"nome": "Outra", "email": "o@example.com", "password": "pw"}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_email_is_400() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;
    let token = admin_token(&app).await;

    let body = json!({"nome": "Ana", "email": "ana@example.com", "password": "pw"});
    let resp = app
        .clone()
        .oneshot(send_json("POST", "/api/auth/register", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .oneshot(send_json("POST", "/api/auth/register", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_roundtrip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let (app, _state) = test_app(temp_dir.path()).await;
    let token = admin_token(&app).await;

    let resp = app
        .clone()
        .oneshot(get("/api/config", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let config = body_json(resp).await;
    assert_eq!(config["appName"], "Estrelas do Norte");

    // Patch only the logo; the name survives.
    let req = send_json(
        "PUT",
        "/api/config",
        Some(&token),
        &json!({"logoURL": "http://cdn/logo.png"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["logoURL"], "http://cdn/logo.png");
    assert_eq!(updated["appName"], "Estrelas do Norte");

    let resp = app.oneshot(get("/api/config", Some(&token))).await.unwrap();
    let reread = body_json(resp).await;
    assert_eq!(reread, updated);
}
