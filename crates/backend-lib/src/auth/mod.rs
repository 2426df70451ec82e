// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod clock;
pub mod cookie;
pub mod credentials;
pub mod password;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie::{SessionCookie, DEFAULT_COOKIE_NAME};
pub use credentials::{
    Credential, CredentialStore, MemoryCredentialStore, SqliteCredentialStore, StoreError,
};
pub use password::{HashError, ScryptHasher, MAX_PASSWORD_BYTES};
pub use session::{spawn_sweeper, InMemorySessionRegistry, Session, SessionRegistry, SESSION_TTL};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
