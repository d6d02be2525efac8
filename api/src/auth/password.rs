use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;

use crate::{config::HashingConfig, error::AppError};

#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    // Verified against when the email is unknown so both login failures cost the same.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(config: HashingConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"timing-equaliser", &salt)?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(plaintext.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Fails closed: an unparseable stored hash never verifies.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("stored password hash is corrupt: {}", e);
                return false;
            }
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns one verification against a throwaway hash.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }

    /// Runs [`Self::hash`] on the blocking pool.
    pub async fn hash_async(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await?
    }

    /// Runs [`Self::verify`] on the blocking pool. `None` burns a dummy verification.
    pub async fn verify_async(
        &self,
        plaintext: String,
        hash: Option<String>,
    ) -> Result<bool, AppError> {
        let hasher = self.clone();
        let verified = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&plaintext, &hash),
            None => {
                hasher.verify_dummy(&plaintext);
                false
            }
        })
        .await?;
        Ok(verified)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> HashingConfig {
    HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}
