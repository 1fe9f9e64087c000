//! End-to-end tests for the local-first repository against a live server.
//!
//! A real axum server runs on an ephemeral localhost port; each client gets
//! its own cache directory, so two repositories model two devices.

use std::path::Path;

use estrelas::cache::CacheStore;
use estrelas::directory::AtletaRepository;
use estrelas::models::Atleta;
use estrelas::remote::ApiClient;
use estrelas::server::accounts::DEFAULT_BOOTSTRAP_PASSWORD;
use estrelas::server::{db, router, AppState};
use estrelas::session::SessionStore;
use serde_json::json;
use tempfile::TempDir;

/// Starts a bootstrapped server on an ephemeral port and returns its URL.
async fn spawn_server(dir: &Path) -> String {
    let pool = db::init_db(dir.join("server.db")).await.unwrap();
    let state = AppState::new(pool);
    state
        .accounts
        .bootstrap(DEFAULT_BOOTSTRAP_PASSWORD)
        .await
        .unwrap();

    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A remote-backed repository with its own cache directory.
fn client(dir: &Path, base_url: &str) -> AtletaRepository {
    let cache = CacheStore::new(dir);
    let session = SessionStore::new(cache.clone());
    AtletaRepository::new(cache, session, Some(ApiClient::new(base_url)))
}

fn record(id: &str, nome: &str) -> Atleta {
    Atleta {
        id: id.to_string(),
        nome: nome.to_string(),
        ..Atleta::default()
    }
}

#[tokio::test]
async fn test_save_syncs_to_second_client() {
    let server_dir = TempDir::new().unwrap();
    let url = spawn_server(server_dir.path()).await;

    let dir_a = TempDir::new().unwrap();
    let repo_a = client(dir_a.path(), &url);
    repo_a.login("admin", "estrelas2026").await.unwrap();

    let saved = repo_a.save_atleta(Atleta::new("Joao")).await.unwrap();

    // A second device with an empty cache sees the record via the merge.
    let dir_b = TempDir::new().unwrap();
    let repo_b = client(dir_b.path(), &url);
    repo_b.login("admin", "estrelas2026").await.unwrap();

    let list = repo_b.get_atletas().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, saved.id);
    assert_eq!(list[0].nome, "Joao");

    // The merge result was persisted, so the record is now a local hit too.
    let found = repo_b.get_atleta_by_id(&saved.id).await.unwrap();
    assert_eq!(found.nome, "Joao");
}

#[tokio::test]
async fn test_local_record_wins_over_remote_edit() {
    let server_dir = TempDir::new().unwrap();
    let url = spawn_server(server_dir.path()).await;

    let dir_a = TempDir::new().unwrap();
    let repo_a = client(dir_a.path(), &url);
    repo_a.login("admin", "estrelas2026").await.unwrap();

    let saved = repo_a.save_atleta(record("shared-id1", "Local")).await.unwrap();
    assert_eq!(saved.id, "shared-id1");

    // Another session edits the same record server-side.
    let dir_b = TempDir::new().unwrap();
    let repo_b = client(dir_b.path(), &url);
    repo_b.login("admin", "estrelas2026").await.unwrap();
    repo_b
        .update_atleta("shared-id1", &json!({"nome": "RemoteEdit"}))
        .await
        .unwrap();

    // The editing session has no local copy, so it sees the server version.
    let list_b = repo_b.get_atletas().await;
    assert_eq!(list_b.len(), 1);
    assert_eq!(list_b[0].nome, "RemoteEdit");

    // The original session keeps its local copy on the id collision.
    let list_a = repo_a.get_atletas().await;
    assert_eq!(list_a.len(), 1);
    assert_eq!(list_a[0].nome, "Local");
}

#[tokio::test]
async fn test_unreachable_server_degrades_to_cache() {
    // Reserve a port and close it again so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let dead_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dir = TempDir::new().unwrap();
    let repo = client(dir.path(), &dead_url);

    // Writes still commit locally.
    let saved = repo.save_atleta(Atleta::new("Offline")).await.unwrap();

    // Reads fall back to the cached list instead of failing.
    let list = repo.get_atletas().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, saved.id);

    // Lookups for unknown ids come back empty rather than erroring.
    assert!(repo.get_atleta_by_id("missing").await.is_none());

    // Updates and deletes are equally unaffected by the dead remote.
    repo.update_atleta(&saved.id, &json!({"peso": "50"}))
        .await
        .unwrap();
    assert!(repo.delete_atleta(&saved.id).await.unwrap());
    assert!(!repo.api_status().await);
}

#[tokio::test]
async fn test_delete_of_unknown_id_completes() {
    let server_dir = TempDir::new().unwrap();
    let url = spawn_server(server_dir.path()).await;

    let dir = TempDir::new().unwrap();
    let repo = client(dir.path(), &url);
    repo.login("admin", "estrelas2026").await.unwrap();

    // Present in neither store: no error, nothing removed.
    assert!(!repo.delete_atleta("missing-id").await.unwrap());
    assert!(repo.get_atletas().await.is_empty());
}

#[tokio::test]
async fn test_config_update_reaches_server() {
    let server_dir = TempDir::new().unwrap();
    let url = spawn_server(server_dir.path()).await;

    let dir = TempDir::new().unwrap();
    let repo = client(dir.path(), &url);
    repo.login("admin", "estrelas2026").await.unwrap();

    repo.update_config(&json!({"appName": "Estrelas FC"}))
        .await
        .unwrap();

    // Read the server copy directly.
    let api = ApiClient::new(url);
    let token = repo.session().token().unwrap();
    let server_config = api.get_config(Some(&token)).await.unwrap();
    assert_eq!(server_config.app_name, "Estrelas FC");
}

#[tokio::test]
async fn test_login_failure_leaves_no_session() {
    let server_dir = TempDir::new().unwrap();
    let url = spawn_server(server_dir.path()).await;

    let dir = TempDir::new().unwrap();
    let repo = client(dir.path(), &url);

    assert!(repo.login("admin", "wrong-password").await.is_err());
    assert!(!repo.session().is_authenticated());

    repo.login("admin", "estrelas2026").await.unwrap();
    assert!(repo.session().is_authenticated());
    assert_eq!(repo.session().current_user().nome, "admin");

    repo.logout().await.unwrap();
    assert!(!repo.session().is_authenticated());
}
