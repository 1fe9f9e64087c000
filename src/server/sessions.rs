//! Bearer-token sessions persisted alongside the accounts.
//!
//! Tokens are opaque random strings with a fixed expiry. Expired rows are
//! deleted whenever they are seen; `purge_expired` sweeps the rest.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;

use super::accounts::{Account, AccountStore};

/// Sessions live for seven days from issuance.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Generates a session token: 32 random bytes, base64url without padding.
fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    account_id: String,
    expires_at: String,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Issues a new token for the account.
    pub async fn create(&self, account_id: &str) -> Result<String, sqlx::Error> {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + Duration::days(SESSION_TTL_DAYS);

        sqlx::query(
            "INSERT INTO sessions (token, account_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(account_id)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Resolves a token to its account. Unknown, malformed, and expired
    /// tokens all come back as `None`; expired rows are deleted on sight.
    pub async fn resolve(&self, token: &str) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT account_id, expires_at FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expired = DateTime::parse_from_rfc3339(&row.expires_at)
            .map(|t| t.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);

        if expired {
            self.delete(token).await?;
            return Ok(None);
        }

        AccountStore::new(self.pool.clone()).get(&row.account_id).await
    }

    /// Invalidates a token. Deleting an unknown token is not an error.
    pub async fn delete(&self, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes all expired sessions. Returns the number of rows deleted.
    pub async fn purge_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
