use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::{
    auth::token::TokenCodec, error::AppError, models::user::User, store::UserStore, AppState,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Token after a case-sensitive `Bearer ` prefix. Empty tokens count as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}

#[derive(Clone)]
pub struct AuthGate {
    tokens: TokenCodec,
    users: UserStore,
}

impl AuthGate {
    pub fn new(tokens: TokenCodec, users: UserStore) -> Self {
        Self { tokens, users }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, AppError> {
        let token = extract_bearer_token(headers).ok_or(AppError::TokenMissing)?;
        let claims = self.tokens.verify(token)?;

        self.users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::IdentityNotFound)
    }
}

/// The authenticated caller, bound once per request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = state.gate.authenticate(&parts.headers).await?;
        Ok(CurrentUser(user))
    }
}
