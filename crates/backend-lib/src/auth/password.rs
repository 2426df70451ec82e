// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Digests are PHC strings (`$scrypt$ln=..,r=..,p=..$salt$hash`): the salt and
//! the cost parameters travel inside the digest, so a digest produced under an
//! older cost still verifies after the configured cost changes.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use thiserror::Error;

/// Longest plaintext accepted by [`ScryptHasher::hash`], in bytes
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Derived key length stored in the digest
const DIGEST_LEN: usize = 32;

/// Failure to produce a digest
#[derive(Error, Debug)]
pub enum HashError {
    #[error("password exceeds {MAX_PASSWORD_BYTES} bytes")]
    TooLong,

    #[error("invalid scrypt parameters: {0}")]
    InvalidParams(String),

    #[error("scrypt failure: {0}")]
    Primitive(String),
}

/// Salted scrypt hasher with a tunable cost
#[derive(Debug, Clone)]
pub struct ScryptHasher {
    params: Params,
}

impl ScryptHasher {
    /// Build a hasher from raw scrypt cost parameters
    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self, HashError> {
        let params = Params::new(log_n, r, p, DIGEST_LEN)
            .map_err(|e| HashError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<String, HashError> {
        if plain.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::TooLong);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params, &salt)
            .map_err(|e| HashError::Primitive(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a password against a digest.
    ///
    /// Every failure (mismatch, unparsable digest, unsupported parameters)
    /// collapses to `false`.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        if plain.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }
}
