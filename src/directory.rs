//! Local-first repository for athlete records and app settings.
//!
//! Every operation commits to the local cache first. When a remote API is
//! configured, reads merge in the server's collection and writes are
//! mirrored best-effort: a remote failure is logged and swallowed because
//! the local write has already succeeded. Without a remote the repository
//! serves the cache alone, which keeps the application usable offline.

use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::watch;

use crate::cache::{CacheError, CacheStore};
use crate::models::{
    merge_record_patch, AppConfig, AppUser, Atleta, RegisterRequest, RegisterResponse,
};
use crate::remote::{ApiClient, ApiError};
use crate::session::SessionStore;

const ATLETAS_KEY: &str = "atletas";
const CONFIG_KEY: &str = "config";

/// Errors surfaced by repository operations that cannot be recovered
/// locally. Background sync failures never appear here.
#[derive(Debug)]
pub enum RepoError {
    /// The local cache could not be read or written.
    Cache(CacheError),
    /// The remote API rejected an operation that required it.
    Api(ApiError),
    /// The operation needs a remote API but the repository runs local-only.
    RemoteDisabled,
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Cache(e) => write!(f, "{}", e),
            RepoError::Api(e) => write!(f, "{}", e),
            RepoError::RemoteDisabled => {
                write!(f, "no API configured; set api_url in the config file")
            }
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepoError::Cache(e) => Some(e),
            RepoError::Api(e) => Some(e),
            RepoError::RemoteDisabled => None,
        }
    }
}

impl From<CacheError> for RepoError {
    fn from(e: CacheError) -> Self {
        RepoError::Cache(e)
    }
}

impl From<ApiError> for RepoError {
    fn from(e: ApiError) -> Self {
        RepoError::Api(e)
    }
}

/// Merges the remote collection into the local one by record id.
///
/// Every local record is kept as-is; remote records are appended only when
/// their id is not present locally. Local edits therefore always win on a
/// collision, and repeated merges with the same remote list are idempotent.
pub fn merge_atletas(local: Vec<Atleta>, remote: Vec<Atleta>) -> Vec<Atleta> {
    let mut merged = local;
    let seen: HashSet<String> = merged.iter().map(|a| a.id.clone()).collect();

    for atleta in remote {
        if !seen.contains(&atleta.id) {
            merged.push(atleta);
        }
    }

    merged
}

/// The sync gateway: cache, session, and optional remote composed behind a
/// single record contract.
pub struct AtletaRepository {
    cache: CacheStore,
    session: SessionStore,
    remote: Option<ApiClient>,
    config_tx: watch::Sender<AppConfig>,
}

impl AtletaRepository {
    /// Builds a repository. `remote: None` selects local-only mode; the
    /// choice is fixed for the lifetime of the value.
    pub fn new(cache: CacheStore, session: SessionStore, remote: Option<ApiClient>) -> Self {
        let initial: AppConfig = cache.read_or_default(CONFIG_KEY);
        let (config_tx, _) = watch::channel(initial);

        Self {
            cache,
            session,
            remote,
            config_tx,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn is_remote_backed(&self) -> bool {
        self.remote.is_some()
    }

    fn token(&self) -> Option<String> {
        self.session.token()
    }

    // ------------------------------------------------------------------
    // Athlete records
    // ------------------------------------------------------------------

    /// Returns the athlete list: the cached records, merged with the remote
    /// collection when one is reachable. A remote failure downgrades to the
    /// cached list and is never surfaced.
    pub async fn get_atletas(&self) -> Vec<Atleta> {
        let local: Vec<Atleta> = self.cache.read_or_default(ATLETAS_KEY);

        let Some(remote) = &self.remote else {
            return local;
        };

        match remote.list_atletas(self.token().as_deref()).await {
            Ok(remote_list) => {
                let merged = merge_atletas(local, remote_list);
                if let Err(e) = self.cache.write(ATLETAS_KEY, &merged) {
                    tracing::warn!("could not persist merged athlete list: {}", e);
                }
                merged
            }
            Err(e) => {
                tracing::warn!("athlete fetch failed, serving cached list: {}", e);
                local
            }
        }
    }

    /// Finds one record, preferring the cache. The remote is consulted only
    /// on a local miss, and a remote failure yields `None`.
    pub async fn get_atleta_by_id(&self, id: &str) -> Option<Atleta> {
        let local: Vec<Atleta> = self.cache.read_or_default(ATLETAS_KEY);
        if let Some(found) = local.into_iter().find(|a| a.id == id) {
            return Some(found);
        }

        let remote = self.remote.as_ref()?;
        match remote.get_atleta(self.token().as_deref(), id).await {
            Ok(atleta) => Some(atleta),
            Err(e) => {
                if !e.is_not_found() {
                    tracing::warn!("athlete lookup for '{}' failed: {}", id, e);
                }
                None
            }
        }
    }

    /// Stores a new record. The id and creation timestamp are assigned here
    /// when absent. The cache write is the commit point; the remote create
    /// that follows is best-effort.
    pub async fn save_atleta(&self, mut atleta: Atleta) -> Result<Atleta, CacheError> {
        atleta.ensure_identity();

        let mut list: Vec<Atleta> = self.cache.read_or_default(ATLETAS_KEY);
        list.push(atleta.clone());
        self.cache.write(ATLETAS_KEY, &list)?;

        if let Some(remote) = &self.remote {
            if let Err(e) = remote
                .create_atleta(self.token().as_deref(), &atleta)
                .await
            {
                tracing::warn!("remote create for '{}' failed: {}", atleta.id, e);
            }
        }

        Ok(atleta)
    }

    /// Shallow-merges `patch` into the cached record with this id. A missing
    /// id is a local no-op. The remote mirror is best-effort either way.
    pub async fn update_atleta(
        &self,
        id: &str,
        patch: &Value,
    ) -> Result<Option<Atleta>, CacheError> {
        let mut list: Vec<Atleta> = self.cache.read_or_default(ATLETAS_KEY);

        let mut updated = None;
        if let Some(entry) = list.iter_mut().find(|a| a.id == id) {
            let base = serde_json::to_value(&*entry)
                .map_err(|e| CacheError::Parse(self.cache.path(ATLETAS_KEY), e))?;
            let merged = merge_record_patch(&base, patch);
            *entry = serde_json::from_value(merged)
                .map_err(|e| CacheError::Parse(self.cache.path(ATLETAS_KEY), e))?;
            updated = Some(entry.clone());
        }

        if updated.is_some() {
            self.cache.write(ATLETAS_KEY, &list)?;
        }

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.update_atleta(self.token().as_deref(), id, patch).await {
                if !e.is_not_found() {
                    tracing::warn!("remote update for '{}' failed: {}", id, e);
                }
            }
        }

        Ok(updated)
    }

    /// Removes the record with this id. Removing an unknown id completes
    /// without error and leaves the cache untouched.
    pub async fn delete_atleta(&self, id: &str) -> Result<bool, CacheError> {
        let mut list: Vec<Atleta> = self.cache.read_or_default(ATLETAS_KEY);
        let before = list.len();
        list.retain(|a| a.id != id);

        let removed = list.len() != before;
        if removed {
            self.cache.write(ATLETAS_KEY, &list)?;
        }

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete_atleta(self.token().as_deref(), id).await {
                if !e.is_not_found() {
                    tracing::warn!("remote delete for '{}' failed: {}", id, e);
                }
            }
        }

        Ok(removed)
    }

    // ------------------------------------------------------------------
    // App config
    // ------------------------------------------------------------------

    /// The cached config singleton. Synchronous; absent means default.
    pub fn get_config(&self) -> AppConfig {
        self.cache.read_or_default(CONFIG_KEY)
    }

    /// Merges `patch` into the config, persists it, publishes the merged
    /// value to watchers, and mirrors it to the remote best-effort.
    pub async fn update_config(&self, patch: &Value) -> Result<AppConfig, CacheError> {
        let current = serde_json::to_value(self.get_config())
            .map_err(|e| CacheError::Parse(self.cache.path(CONFIG_KEY), e))?;
        let merged: AppConfig = serde_json::from_value(merge_record_patch(&current, patch))
            .map_err(|e| CacheError::Parse(self.cache.path(CONFIG_KEY), e))?;

        self.cache.write(CONFIG_KEY, &merged)?;

        // Fire-and-forget: no subscribers is fine, late subscribers still
        // observe the latest value.
        self.config_tx.send_replace(merged.clone());

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.put_config(self.token().as_deref(), &merged).await {
                tracing::warn!("remote config update failed: {}", e);
            }
        }

        Ok(merged)
    }

    /// Subscribes to config changes. Dropping the receiver unsubscribes.
    pub fn watch_config(&self) -> watch::Receiver<AppConfig> {
        self.config_tx.subscribe()
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Authenticates against the remote API and stores the session.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AppUser, RepoError> {
        let remote = self.remote.as_ref().ok_or(RepoError::RemoteDisabled)?;
        let response = remote.login(identifier, password).await?;
        self.session.set(&response.token, &response.user)?;
        Ok(response.user)
    }

    /// Registers a user. When the server answers with a token (the
    /// bootstrap first-user case) the session is stored as well.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, RepoError> {
        let remote = self.remote.as_ref().ok_or(RepoError::RemoteDisabled)?;
        let response = remote.register(self.token().as_deref(), request).await?;
        if let Some(token) = &response.token {
            self.session.set(token, &response.user)?;
        }
        Ok(response)
    }

    /// Invalidates the server-side token best-effort, then clears the local
    /// session.
    pub async fn logout(&self) -> Result<(), CacheError> {
        if let (Some(remote), Some(token)) = (&self.remote, self.token()) {
            if let Err(e) = remote.logout(&token).await {
                tracing::warn!("server-side logout failed: {}", e);
            }
        }
        self.session.clear()
    }

    /// Reachability probe. Local-only repositories always report true.
    pub async fn api_status(&self) -> bool {
        match &self.remote {
            Some(remote) => matches!(remote.health().await, Ok(h) if h.ok),
            None => true,
        }
    }
}
