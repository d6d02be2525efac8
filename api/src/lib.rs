pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod rest;
pub mod store;
pub mod validation;

use sqlx::sqlite::SqlitePool;

use crate::{
    auth::{AuthGate, PasswordHasher, TokenCodec},
    config::{HashingConfig, TokenConfig},
    error::AppError,
    store::{NoteStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub notes: NoteStore,
    pub tokens: TokenCodec,
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(db: SqlitePool, token: TokenConfig, hashing: HashingConfig) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new(hashing)?;
        let users = UserStore::new(db.clone(), hasher);
        let tokens = TokenCodec::new(token);

        Ok(Self {
            gate: AuthGate::new(tokens.clone(), users.clone()),
            notes: NoteStore::new(db),
            users,
            tokens,
        })
    }
}

#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    let pool = store::connect_in_memory().await.unwrap();
    AppState::new(
        pool,
        TokenConfig::new("unit-test-secret"),
        auth::password::test_config(),
    )
    .unwrap()
}
