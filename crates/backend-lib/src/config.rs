// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Layers, later wins: built-in defaults, a TOML file, then `SPICE_*`
//! environment variables (`SPICE_SESSION__TTL_SECS=3600` sets `session.ttl_secs`).
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{cookie::is_valid_cookie_name, ScryptHasher, DEFAULT_COOKIE_NAME};
use crate::validation::{CredentialRules, MIN_PASSWORD_LENGTH};

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

const ENV_PREFIX: &str = "SPICE_";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// SQLite file holding the accounts
    pub database_path: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    pub session: SessionSettings,
    pub password: PasswordSettings,
}

/// Session cookie and lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Session lifetime in seconds
    pub ttl_secs: u64,
    /// How often expired sessions are swept; 0 disables the sweeper
    pub sweep_interval_secs: u64,
    /// Add `Secure` to the cookie (only when served over HTTPS)
    pub secure_cookie: bool,
}

/// Password rules and scrypt cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordSettings {
    pub min_length: usize,
    pub scrypt_log_n: u8,
    pub scrypt_r: u32,
    pub scrypt_p: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: PathBuf::from("users.db"),
            static_dir: PathBuf::from("static"),
            log_level: "info".to_string(),
            session: SessionSettings::default(),
            password: PasswordSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl_secs: 60 * 60 * 24, // 24 hours
            sweep_interval_secs: 60 * 60,
            secure_cookie: false,
        }
    }
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            scrypt_log_n: 15,
            scrypt_r: 8,
            scrypt_p: 1,
        }
    }
}

impl Settings {
    /// Load from [`DEFAULT_CONFIG_PATH`] (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from `path` (if present) and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level {:?}",
                self.log_level
            )));
        }
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::Invalid("session.ttl_secs must be positive".into()));
        }
        if !is_valid_cookie_name(&self.session.cookie_name) {
            return Err(ConfigError::Invalid(format!(
                "invalid cookie name {:?}",
                self.session.cookie_name
            )));
        }
        if self.password.min_length < MIN_PASSWORD_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "password.min_length must be at least {MIN_PASSWORD_LENGTH}"
            )));
        }
        self.hasher()?;
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session.ttl_secs)
    }

    /// `None` when sweeping is disabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.session.sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.session.sweep_interval_secs))
    }

    pub fn hasher(&self) -> Result<ScryptHasher, ConfigError> {
        ScryptHasher::new(
            self.password.scrypt_log_n,
            self.password.scrypt_r,
            self.password.scrypt_p,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn credential_rules(&self) -> CredentialRules {
        CredentialRules {
            min_password_length: self.password.min_length,
        }
    }
}
