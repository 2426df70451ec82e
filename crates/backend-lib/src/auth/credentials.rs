// ============================
// crates/backend-lib/src/auth/credentials.rs
// ============================
//! Credential store: username → password digest.
//!
//! Uniqueness is decided by the insert itself (a `UNIQUE` column, or the map
//! entry lock), never by a lookup before the insert.
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use thiserror::Error;

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("no such user")]
    NotFound,

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Trait for credential backends
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new account, returning its id
    async fn create(&self, username: &str, password_hash: &str) -> Result<i64, StoreError>;

    /// Fetch an account by exact username
    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError>;
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);";

/// SQLite implementation of the [`CredentialStore`] trait
#[derive(Clone)]
pub struct SqliteCredentialStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCredentialStore {
    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::init(conn)
    }

    /// Private database that disappears with the store
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of rows holding `username`
    pub async fn count_username(&self, username: &str) -> Result<i64, StoreError> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )?)
        })
        .await
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        let username = username.to_string();
        let password_hash = password_hash.to_string();
        self.with_conn(move |conn| {
            let result = conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                params![username, password_hash],
            );
            match result {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::DuplicateUsername)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(Credential {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NotFound)
        })
        .await
    }
}

/// In-process credential store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: DashMap<String, Credential>,
    last_id: AtomicI64,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUsername),
            Entry::Vacant(slot) => {
                let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
                slot.insert(Credential {
                    id,
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                });
                Ok(id)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError> {
        self.users
            .get(username)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }
}
