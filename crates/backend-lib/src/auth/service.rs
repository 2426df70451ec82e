use async_trait::async_trait;
use super::Session;
use crate::error::AuthError;

/// Account and session operations behind the register/login/logout pages
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate, hash and store a new account, returning its id
    async fn register(&self, username: &str, password: &str) -> Result<i64, AuthError>;
    /// Check credentials and mint a session
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;
    /// End a session; unknown tokens are fine
    async fn logout(&self, token: &str) -> Result<(), AuthError>;
    /// Look a session up by token
    async fn resolve(&self, token: &str) -> Result<Session, AuthError>;
}
