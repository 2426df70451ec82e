// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend functionality for the Spice Paradise restaurant site.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod validation;
pub mod views;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{
    AuthService, CredentialStore, DefaultAuth, InMemorySessionRegistry, SessionCookie,
    SessionRegistry, SystemClock,
};
use crate::config::Settings;
use crate::error::AppError;
use crate::middleware::AccessGate;

/// Application state shared across all handlers.
///
/// The session registry is created empty here and dropped with the state;
/// sessions never outlive the process.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Session registry
    pub sessions: Arc<dyn SessionRegistry>,
    /// Gate for protected routes
    pub gate: AccessGate,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create application state with an in-memory session registry
    pub fn new(store: Arc<dyn CredentialStore>, settings: Settings) -> Result<Self, AppError> {
        let sessions = Arc::new(InMemorySessionRegistry::new(
            settings.session_ttl(),
            Arc::new(SystemClock),
        ));
        Self::with_sessions(store, sessions, settings)
    }

    /// Create application state around a caller-supplied session registry
    pub fn with_sessions(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionRegistry>,
        settings: Settings,
    ) -> Result<Self, AppError> {
        settings
            .validate()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let hasher = settings
            .hasher()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let auth = DefaultAuth::new(
            store,
            Arc::clone(&sessions),
            hasher,
            settings.credential_rules(),
        )?;
        let gate = AccessGate::new(
            Arc::clone(&sessions),
            SessionCookie::new(
                settings.session.cookie_name.clone(),
                settings.session.secure_cookie,
            ),
        );

        Ok(Self {
            auth: Arc::new(auth),
            sessions,
            gate,
            settings: Arc::new(settings),
        })
    }
}

impl FromRef<AppState> for AccessGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}
