//! Account storage and password verification.
//!
//! Passwords are stored only as Argon2 PHC strings; the hash never leaves
//! this module and plaintext is dropped as soon as it is verified.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{AppUser, UserRole};

/// Default credentials seeded into an empty account store so a fresh
/// deployment can be administered at all.
pub const BOOTSTRAP_NOME: &str = "admin";
pub const BOOTSTRAP_EMAIL: &str = "admin@estrelas.local";
pub const DEFAULT_BOOTSTRAP_PASSWORD: &str = "estrelas2026";

#[derive(Debug)]
pub enum AccountError {
    Database(sqlx::Error),
    Hash(argon2::password_hash::Error),
    EmailTaken,
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::Database(e) => write!(f, "database error: {}", e),
            AccountError::Hash(e) => write!(f, "password hash error: {}", e),
            AccountError::EmailTaken => write!(f, "email already registered"),
        }
    }
}

impl std::error::Error for AccountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccountError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AccountError {
    fn from(e: sqlx::Error) -> Self {
        AccountError::Database(e)
    }
}

/// A stored account, without the password hash.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub role: UserRole,
}

impl Account {
    pub fn to_user(&self) -> AppUser {
        AppUser {
            id: self.id.clone(),
            nome: self.nome.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    nome: String,
    email: String,
    role: String,
    password_hash: String,
}

impl AccountRow {
    fn into_account(self) -> Account {
        let role = self.role.parse().unwrap_or_else(|_| {
            tracing::warn!("account '{}' has unknown role '{}'", self.email, self.role);
            UserRole::Visualizador
        });
        Account {
            id: self.id,
            nome: self.nome,
            email: self.email,
            role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
    }

    /// Creates an account. The email must be unique.
    pub async fn create(
        &self,
        nome: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Account, AccountError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(AccountError::Hash)?
            .to_string();

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (id, nome, email, role, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(nome)
        .bind(email)
        .bind(role.as_str())
        .bind(&hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Account {
                id,
                nome: nome.to_string(),
                email: email.to_string(),
                role,
            }),
            Err(e) => {
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    Err(AccountError::EmailTaken)
                } else {
                    Err(AccountError::Database(e))
                }
            }
        }
    }

    /// Looks up an account by email or nome.
    pub async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> =
            sqlx::query_as("SELECT * FROM accounts WHERE email = ? OR nome = ?")
                .bind(identifier)
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(AccountRow::into_account))
    }

    /// Checks credentials. Unknown identifier and wrong password are both
    /// `Ok(None)` so callers cannot distinguish them.
    pub async fn verify(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError> {
        let row: Option<AccountRow> =
            sqlx::query_as("SELECT * FROM accounts WHERE email = ? OR nome = ?")
                .bind(identifier)
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let parsed = PasswordHash::new(&row.password_hash).map_err(AccountError::Hash)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(row.into_account()))
        } else {
            Ok(None)
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AccountRow::into_account))
    }

    pub async fn list(&self) -> Result<Vec<Account>, sqlx::Error> {
        let rows: Vec<AccountRow> = sqlx::query_as("SELECT * FROM accounts ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(AccountRow::into_account).collect())
    }

    pub async fn set_role(&self, email: &str, role: UserRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE accounts SET role = ?, updated_at = ? WHERE email = ?")
            .bind(role.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(&self, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Seeds the bootstrap ADMIN account when the store is empty. Returns
    /// the created account, or `None` when accounts already exist.
    pub async fn bootstrap(&self, password: &str) -> Result<Option<Account>, AccountError> {
        if self.count().await? > 0 {
            return Ok(None);
        }

        let account = self
            .create(BOOTSTRAP_NOME, BOOTSTRAP_EMAIL, password, UserRole::Admin)
            .await?;
        Ok(Some(account))
    }
}
