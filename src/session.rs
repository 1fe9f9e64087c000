//! Client-side session state: the bearer token and user summary returned by
//! a successful login.
//!
//! A process holds at most one session. Setting a new session overwrites the
//! previous one; the two values are never merged.

use crate::cache::{CacheError, CacheStore};
use crate::models::AppUser;

const TOKEN_KEY: &str = "auth_token";
const USER_KEY: &str = "auth_user";

/// Persisted token/user pair.
#[derive(Debug, Clone)]
pub struct SessionStore {
    cache: CacheStore,
}

impl SessionStore {
    pub fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    /// Stores the session, replacing any previous one.
    pub fn set(&self, token: &str, user: &AppUser) -> Result<(), CacheError> {
        self.cache.write(TOKEN_KEY, token)?;
        self.cache.write(USER_KEY, user)
    }

    /// Drops the session. Safe to call when no session exists.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.cache.remove(TOKEN_KEY)?;
        self.cache.remove(USER_KEY)
    }

    /// The stored bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.cache
            .read::<String>(TOKEN_KEY)
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
    }

    /// True only when both token and user are present.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.cache.read::<AppUser>(USER_KEY).ok().flatten().is_some()
    }

    /// The stored user, or a read-only placeholder when no session exists.
    /// Never fails.
    pub fn current_user(&self) -> AppUser {
        match self.cache.read::<AppUser>(USER_KEY) {
            Ok(Some(user)) => user,
            _ => AppUser::placeholder(),
        }
    }
}
