// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Input checks applied at the registration and login boundaries, before
//! anything reaches the credential store.

use thiserror::Error;

/// Default minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Possible validation errors. The display text is shown to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username and password are required.")]
    MissingCredentials,

    #[error("Password must be at least {0} characters long.")]
    PasswordTooShort(usize),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Account rules enforced at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialRules {
    pub min_password_length: usize,
}

impl Default for CredentialRules {
    fn default() -> Self {
        Self {
            min_password_length: MIN_PASSWORD_LENGTH,
        }
    }
}

impl CredentialRules {
    /// Check a registration attempt
    pub fn validate_registration(&self, username: &str, password: &str) -> ValidationResult<()> {
        validate_present(username, password)?;
        if password.chars().count() < self.min_password_length {
            return Err(ValidationError::PasswordTooShort(self.min_password_length));
        }
        Ok(())
    }
}

/// Both fields must be non-empty
pub fn validate_present(username: &str, password: &str) -> ValidationResult<()> {
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}
