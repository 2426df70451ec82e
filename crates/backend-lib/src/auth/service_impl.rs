use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{error, info, instrument};

use crate::auth::{
    AuthService, CredentialStore, ScryptHasher, Session, SessionRegistry, StoreError,
};
use crate::error::AuthError;
use crate::metrics as keys;
use crate::validation::{validate_present, CredentialRules};

/// Auth service over a credential store and a session registry
pub struct DefaultAuth {
    store: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionRegistry>,
    hasher: ScryptHasher,
    rules: CredentialRules,
    /// Verified against when the username is unknown, so both failure paths
    /// cost one scrypt evaluation
    dummy_digest: String,
}

impl DefaultAuth {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionRegistry>,
        hasher: ScryptHasher,
        rules: CredentialRules,
    ) -> Result<Self, AuthError> {
        let dummy_digest = hasher.hash("spice-paradise-dummy-password")?;
        Ok(Self {
            store,
            sessions,
            hasher,
            rules,
            dummy_digest,
        })
    }

    async fn hash(&self, plain: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?
            .map_err(AuthError::from)
    }

    async fn verify(&self, plain: &str, digest: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let plain = plain.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &digest))
            .await
            .map_err(|e| AuthError::HashingFailure(e.to_string()))
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    #[instrument(skip(self, password))]
    async fn register(&self, username: &str, password: &str) -> Result<i64, AuthError> {
        self.rules.validate_registration(username, password)?;

        let digest = self.hash(password).await.inspect_err(|e| {
            error!(error = %e, "password hashing failed during registration");
        })?;

        match self.store.create(username, &digest).await {
            Ok(user_id) => {
                counter!(keys::USER_REGISTERED).increment(1);
                info!(user_id, "user registered");
                Ok(user_id)
            }
            Err(StoreError::DuplicateUsername) => {
                info!("registration rejected: username taken");
                Err(AuthError::DuplicateUsername)
            }
            Err(e) => {
                error!(error = %e, "failed to insert user");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        validate_present(username, password)?;

        let credential = match self.store.find_by_username(username).await {
            Ok(credential) => credential,
            Err(StoreError::NotFound) => {
                self.verify(password, &self.dummy_digest).await?;
                counter!(keys::LOGIN_FAILED).increment(1);
                info!("login rejected: unknown user");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "failed to fetch user");
                return Err(e.into());
            }
        };

        if !self.verify(password, &credential.password_hash).await? {
            counter!(keys::LOGIN_FAILED).increment(1);
            info!(user_id = credential.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self
            .sessions
            .create(credential.id, &credential.username)
            .await?;
        counter!(keys::LOGIN_SUCCEEDED).increment(1);
        info!(user_id = credential.id, "user logged in");
        Ok(session)
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.revoke(token).await
    }

    async fn resolve(&self, token: &str) -> Result<Session, AuthError> {
        self.sessions.resolve(token).await
    }
}
