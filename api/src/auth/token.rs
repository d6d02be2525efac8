use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies HS256 identity tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: TokenConfig,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is compared against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn issue(&self, identity_id: &str, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(identity_id, email, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: identity_id.to_string(),
            email: email.to_string(),
            iat,
            exp: iat + self.config.ttl.num_seconds(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Signature is checked before expiry, so a forged token never reports `Expired`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(TokenConfig::new(secret))
    }

    #[test]
    fn issued_token_has_three_url_safe_segments() {
        let token = codec("s3cret").issue("user-1", "a@b.co").unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'));
    }

    #[test]
    fn verify_returns_claims() {
        let codec = codec("s3cret");
        let now = Utc::now();
        let token = codec.issue_at("user-1", "a@b.co", now).unwrap();
        let claims = codec.verify_at(&token, now).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@b.co");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + 24 * 60 * 60);
    }

    #[test]
    fn expires_exactly_after_ttl() {
        let codec = codec("s3cret");
        let issued = Utc::now();
        let token = codec.issue_at("user-1", "a@b.co", issued).unwrap();

        let almost = issued + Duration::hours(24) - Duration::seconds(1);
        assert!(codec.verify_at(&token, almost).is_ok());

        let late = issued + Duration::hours(24) + Duration::seconds(1);
        assert_eq!(codec.verify_at(&token, late), Err(TokenError::Expired));
    }

    #[test]
    fn custom_ttl_is_respected() {
        let codec = TokenCodec::new(TokenConfig::new("k").with_ttl(Duration::minutes(5)));
        let issued = Utc::now();
        let token = codec.issue_at("u", "e@x.io", issued).unwrap();
        assert_eq!(
            codec.verify_at(&token, issued + Duration::minutes(6)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn wrong_secret_is_bad_signature() {
        let token = codec("one").issue("user-1", "a@b.co").unwrap();
        assert_eq!(codec("two").verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec("s3cret");
        let token = codec.issue("user-1", "a@b.co").unwrap();
        let other = codec.issue("user-2", "c@d.co").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        parts[1] = other_parts[1];
        let forged = parts.join(".");
        assert_eq!(codec.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec("s3cret");
        assert_eq!(codec.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
        assert_eq!(codec.verify("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn forged_expired_token_is_not_reported_as_expired() {
        let issued = Utc::now() - Duration::days(3);
        let token = codec("one").issue_at("user-1", "a@b.co", issued).unwrap();
        assert_eq!(codec("two").verify(&token), Err(TokenError::BadSignature));
        assert_eq!(codec("one").verify(&token), Err(TokenError::Expired));
    }
}
