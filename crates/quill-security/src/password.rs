//! Password hashing with Argon2

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use quill_shared::config::PasswordSettings;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("Hash error: {0}")]
    HashError(String),
}

/// Argon2id hasher with fixed cost parameters.
///
/// Holds a precomputed hash of a throwaway password so that a login for an
/// unknown username can spend the same verification time as a real one.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordService {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = Self::hash_with(&argon2, "quill-timing-equalizer")?;
        Ok(Self { argon2, dummy_hash })
    }

    pub fn from_settings(settings: &PasswordSettings) -> Result<Self, PasswordError> {
        Self::new(settings.memory_kib, settings.iterations, settings.parallelism)
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Self::hash_with(&self.argon2, password)
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::HashError(e.to_string())),
        }
    }

    /// Burns one verification's worth of CPU against the throwaway hash.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }

    fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }
}
