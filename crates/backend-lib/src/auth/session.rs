// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
//!
//! Sessions live in process memory only. The registry starts empty, is never
//! written to disk, and everything in it is lost when the process exits:
//! every user has to log in again after a restart.
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use metrics::{counter, gauge};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::token_generator::generate_secure_token;
use crate::error::AuthError;
use crate::metrics as keys;

/// Session TTL (time to live)
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24); // 24 hours

/// A logged-in user's session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Valid iff `now < expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Token → session mapping.
///
/// Callers hold this as `Arc<dyn SessionRegistry>` so the in-memory map can
/// be swapped for a shared store without touching them.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Mint a session for `user_id`; the returned record's `token` is the handle
    async fn create(&self, user_id: i64, username: &str) -> Result<Session, AuthError>;

    /// Look a token up.
    ///
    /// `SessionInvalid` if unknown; `SessionExpired` if it had expired, in
    /// which case it is evicted and later lookups are `SessionInvalid`.
    async fn resolve(&self, token: &str) -> Result<Session, AuthError>;

    /// Drop a token. Unknown tokens are not an error.
    async fn revoke(&self, token: &str) -> Result<(), AuthError>;

    /// Drop every expired entry, returning how many went
    async fn sweep(&self) -> Result<usize, AuthError> {
        Ok(0)
    }
}

/// Session registry backed by a sharded concurrent map
#[derive(Debug, Clone)]
pub struct InMemorySessionRegistry {
    sessions: Arc<DashMap<String, Session>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new(SESSION_TTL, Arc::new(SystemClock))
    }
}

impl InMemorySessionRegistry {
    /// Create an empty registry
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Number of entries, expired or not
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn insert_fresh(&self, session: Session) -> Session {
        // 256-bit tokens do not collide in practice; loop anyway so an
        // existing session can never be overwritten.
        let mut session = session;
        loop {
            match self.sessions.entry(session.token.clone()) {
                Entry::Occupied(_) => session.token = generate_secure_token(),
                Entry::Vacant(slot) => {
                    slot.insert(session.clone());
                    return session;
                }
            }
        }
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn create(&self, user_id: i64, username: &str) -> Result<Session, AuthError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = self.insert_fresh(Session {
            token: generate_secure_token(),
            user_id,
            username: username.to_string(),
            created_at: now,
            expires_at,
        });

        counter!(keys::SESSION_CREATED).increment(1);
        gauge!(keys::SESSION_ACTIVE).set(self.sessions.len() as f64);
        debug!(user_id, username, %expires_at, "session created");

        Ok(session)
    }

    async fn resolve(&self, token: &str) -> Result<Session, AuthError> {
        let now = self.clock.now();
        match self.sessions.entry(token.to_string()) {
            Entry::Vacant(_) => Err(AuthError::SessionInvalid),
            Entry::Occupied(entry) => {
                if entry.get().is_valid_at(now) {
                    return Ok(entry.get().clone());
                }
                let (_, expired) = entry.remove_entry();
                counter!(keys::SESSION_EXPIRED).increment(1);
                gauge!(keys::SESSION_ACTIVE).set(self.sessions.len() as f64);
                debug!(user_id = expired.user_id, "session expired on lookup");
                Err(AuthError::SessionExpired)
            }
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        if let Some((_, session)) = self.sessions.remove(token) {
            counter!(keys::SESSION_REVOKED).increment(1);
            gauge!(keys::SESSION_ACTIVE).set(self.sessions.len() as f64);
            debug!(user_id = session.user_id, "session revoked");
        }
        Ok(())
    }

    async fn sweep(&self) -> Result<usize, AuthError> {
        let now = self.clock.now();
        let before_count = self.sessions.len();
        self.sessions.retain(|_, session| session.is_valid_at(now));
        let after_count = self.sessions.len();
        let removed = before_count.saturating_sub(after_count);

        if removed > 0 {
            counter!(keys::SESSION_EXPIRED).increment(removed as u64);
        }
        gauge!(keys::SESSION_ACTIVE).set(after_count as f64);

        Ok(removed)
    }
}

/// Periodically sweep expired sessions.
///
/// Purely a memory optimisation: lookups evict expired entries on their own.
pub fn spawn_sweeper(registry: Arc<dyn SessionRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match registry.sweep().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "swept expired sessions"),
                Err(e) => tracing::warn!(error = %e, "session sweep failed"),
            }
        }
    })
}
