use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::{
    auth::password::PasswordHasher,
    error::AppError,
    models::user::{User, UserCredential},
};

const USER_COLUMNS: &str = "id, email, created_at, updated_at";

/// Lowercases and trims an email so lookups and the UNIQUE index agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct UserStore {
    db: SqlitePool,
    hasher: PasswordHasher,
}

impl UserStore {
    pub fn new(db: SqlitePool, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    /// Hashes the password, then inserts. The UNIQUE index on `email` is the
    /// authoritative duplicate check; a violation surfaces as `AppError::Duplicate`.
    pub async fn create(&self, email: &str, plaintext_password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        let password_hash = self
            .hasher
            .hash_async(plaintext_password.to_string())
            .await?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&email)
        .bind(&password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// The only read that returns the password hash.
    pub async fn find_by_email_with_credential(
        &self,
        email: &str,
    ) -> Result<Option<UserCredential>, AppError> {
        let credential = sqlx::query_as::<_, UserCredential>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;
        Ok(credential)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    /// Best-effort pre-check; `create` still enforces uniqueness.
    pub async fn exists(&self, email: &str) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }
}
