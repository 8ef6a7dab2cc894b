//! Argon2id password hashing behind the `PasswordHasher` port.

use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngExt;

use crate::domain::repository::PasswordHasher;
use crate::error::ApiError;

/// Argon2id hasher with a configurable time cost (`HASH_TIME_COST`).
/// Memory and parallelism stay at the library defaults; verification reads
/// its parameters from the stored PHC string, so cost changes only affect
/// newly hashed passwords.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Hasher {
    time_cost: u32,
}

impl Argon2Hasher {
    pub fn new(time_cost: u32) -> Self {
        Self {
            time_cost: time_cost.max(1),
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, ApiError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            self.time_cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, ApiError> {
        use argon2::password_hash::PasswordHasher as _;

        let salt_bytes: [u8; 16] = rand::rng().random();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("encode salt: {e}")))?;

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("hash password: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("parse password hash: {e}")))?;
        match self.argon2()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ApiError::Internal(anyhow::anyhow!("verify password: {e}"))),
        }
    }
}
