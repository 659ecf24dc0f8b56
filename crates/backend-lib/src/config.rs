// ============================
// visionassist-backend/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use axum::http::HeaderValue;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix for every setting
pub const ENV_PREFIX: &str = "VISIONASSIST_";

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Secrets shorter than this are accepted but logged as weak
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Upper bound on the access-token lifetime (about five years)
pub const MAX_TOKEN_TTL_MINUTES: u64 = 5 * 365 * 24 * 60;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("auth.jwt_secret must be set")]
    MissingSecret,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Load(#[from] figment::Error),
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Take the client address from `X-Real-IP` / `X-Forwarded-For`.
    /// Only enable behind a proxy that overwrites these headers.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root directory of the flat-file store
    pub path: PathBuf,
}

/// Token signing and credential hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HMAC key for access tokens; no default on purpose
    pub jwt_secret: Option<String>,
    pub jwt_algorithm: String,
    pub access_token_expire_minutes: u64,
    /// Failed logins from one client before it is locked out
    pub max_failed_logins: u32,
    pub lockout_secs: u64,
    pub hashing: HashingSettings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Argon2id,
    Scrypt,
}

/// Work factors for the password KDF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingSettings {
    pub algorithm: HashAlgorithm,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub scrypt_log_n: u8,
    pub scrypt_r: u32,
    pub scrypt_p: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_requests: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            rate_limit: RateLimitSettings::default(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            trust_forwarded_headers: false,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_algorithm: "HS256".to_string(),
            access_token_expire_minutes: 60,
            max_failed_logins: 5,
            lockout_secs: 5 * 60,
            hashing: HashingSettings::default(),
        }
    }
}

impl Default for HashingSettings {
    // OWASP baseline for argon2id; scrypt mirrors the crate's recommended cost
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Argon2id,
            argon2_memory_kib: 19 * 1024,
            argon2_iterations: 2,
            argon2_parallelism: 1,
            scrypt_log_n: 17,
            scrypt_r: 8,
            scrypt_p: 1,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 100,
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from a specific file and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Self::figment(path).extract()?;
        Ok(settings)
    }

    /// Provider stack: defaults, then the file, then prefixed env vars, then
    /// the bare `JWT_*` names older deployments export.
    pub fn figment<P: AsRef<Path>>(path: P) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["JWT_SECRET", "JWT_ALGORITHM", "ACCESS_TOKEN_EXPIRE_MINUTES"])
                    .map(|key| format!("auth.{}", key.as_str().to_ascii_lowercase()).into()),
            )
    }

    /// Check every invariant the server relies on at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: format!("expected one of {LOG_LEVELS:?}"),
            });
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit",
                reason: "window and request budget must be positive".to_string(),
            });
        }

        for origin in &self.cors_origins {
            if origin == "*" || HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    field: "cors_origins",
                    reason: format!("not a usable origin: {origin}"),
                });
            }
        }

        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                field: "server",
                reason: format!("{e}"),
            })
    }
}

impl AuthSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.jwt_secret.as_deref() {
            None | Some("") => return Err(ConfigError::MissingSecret),
            Some(secret) if secret.len() < RECOMMENDED_SECRET_LEN => {
                tracing::warn!(
                    "auth.jwt_secret is shorter than {RECOMMENDED_SECRET_LEN} bytes; use a longer random key"
                );
            },
            Some(_) => {},
        }

        self.algorithm()?;

        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.access_token_expire_minutes) {
            return Err(ConfigError::Invalid {
                field: "auth.access_token_expire_minutes",
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_MINUTES} minutes"),
            });
        }

        if self.max_failed_logins == 0 {
            return Err(ConfigError::Invalid {
                field: "auth.max_failed_logins",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// The signing algorithm; only the HMAC family works with a shared secret
    pub fn algorithm(&self) -> Result<Algorithm, ConfigError> {
        match Algorithm::from_str(&self.jwt_algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
            _ => Err(ConfigError::UnsupportedAlgorithm(self.jwt_algorithm.clone())),
        }
    }
}
