// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and validated
//! eagerly. A missing signing secret or revocation store URL stops the
//! process before any request is served.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TOKEN_SIGN_KEY` | Symmetric secret used to sign session tokens | Required |
//! | `TOKEN_ALGORITHM` | `HS256`, `HS384` or `HS512` | `HS512` |
//! | `TOKEN_EXPIRY_POLICY` | `ignore` or `enforce` | `ignore` |
//! | `REDIS_URL` | Revocation store connection string | Required |
//! | `REVOCATION_TIMEOUT_MS` | Timeout for a single store call | `2000` |
//! | `REVOCATION_KEY_PREFIX` | Prefix prepended to identity set keys | empty |
//! | `REVOCATION_INDEX_KEY` | Set listing identities with blocked tokens | `revocation:identities` |
//! | `SWEEP_INTERVAL_SECS` | Background sweep period (`0` disables) | `3600` |
//! | `DIRECTORY_SEED_PATH` | JSON file seeding the in-memory directory | Optional |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::logging::LogFormat;

pub const TOKEN_SIGN_KEY_ENV: &str = "TOKEN_SIGN_KEY";
pub const TOKEN_ALGORITHM_ENV: &str = "TOKEN_ALGORITHM";
pub const TOKEN_EXPIRY_POLICY_ENV: &str = "TOKEN_EXPIRY_POLICY";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const REVOCATION_TIMEOUT_ENV: &str = "REVOCATION_TIMEOUT_MS";
pub const REVOCATION_KEY_PREFIX_ENV: &str = "REVOCATION_KEY_PREFIX";
pub const REVOCATION_INDEX_KEY_ENV: &str = "REVOCATION_INDEX_KEY";
pub const SWEEP_INTERVAL_ENV: &str = "SWEEP_INTERVAL_SECS";
pub const DIRECTORY_SEED_PATH_ENV: &str = "DIRECTORY_SEED_PATH";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_REVOCATION_TIMEOUT: Duration = Duration::from_millis(2000);
pub const DEFAULT_KEY_PREFIX: &str = "revocation:tokens:";
pub const DEFAULT_INDEX_KEY: &str = "revocation:identities";
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("token signing secret is empty")]
    EmptySigningKey,

    #[error("algorithm {0:?} is not a symmetric HMAC algorithm")]
    UnsupportedAlgorithm(Algorithm),
}

/// Whether `exp` is checked when a token is validated.
///
/// `Ignore` accepts any token with a correct signature; the one-year expiry is
/// encoded in every token but revocation is the only invalidation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    #[default]
    Ignore,
    Enforce,
}

impl FromStr for ExpiryPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(ExpiryPolicy::Ignore),
            "enforce" => Ok(ExpiryPolicy::Enforce),
            _ => Err(()),
        }
    }
}

/// Signing material and validation policy for session tokens.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expiry_policy: ExpiryPolicy,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("expiry_policy", &self.expiry_policy)
            .finish()
    }
}

/// Revocation store connection and key layout.
#[derive(Debug, Clone)]
pub struct RevocationSettings {
    pub redis_url: String,
    pub timeout: Duration,
    pub key_prefix: String,
    pub index_key: String,
    /// `None` disables the background sweeper.
    pub sweep_interval: Option<Duration>,
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: TokenSettings,
    pub revocation: RevocationSettings,
    pub directory_seed: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(TOKEN_SIGN_KEY_ENV).ok_or(ConfigError::Missing(TOKEN_SIGN_KEY_ENV))?;
        if secret.is_empty() {
            return Err(ConfigError::EmptySigningKey);
        }

        let algorithm = match lookup(TOKEN_ALGORITHM_ENV) {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::HS512,
        };

        let expiry_policy = match lookup(TOKEN_EXPIRY_POLICY_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: TOKEN_EXPIRY_POLICY_ENV,
                value: raw.clone(),
                reason: "expected `ignore` or `enforce`",
            })?,
            None => ExpiryPolicy::default(),
        };

        let redis_url = lookup(REDIS_URL_ENV)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing(REDIS_URL_ENV))?;

        let timeout = match lookup(REVOCATION_TIMEOUT_ENV) {
            Some(raw) => match parse_u64(REVOCATION_TIMEOUT_ENV, &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        var: REVOCATION_TIMEOUT_ENV,
                        value: raw,
                        reason: "timeout must be positive",
                    })
                }
                ms => Duration::from_millis(ms),
            },
            None => DEFAULT_REVOCATION_TIMEOUT,
        };

        let sweep_interval = match lookup(SWEEP_INTERVAL_ENV) {
            Some(raw) => match parse_u64(SWEEP_INTERVAL_ENV, &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => Some(DEFAULT_SWEEP_INTERVAL),
        };

        let key_prefix =
            lookup(REVOCATION_KEY_PREFIX_ENV).unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());
        let index_key =
            lookup(REVOCATION_INDEX_KEY_ENV).unwrap_or_else(|| DEFAULT_INDEX_KEY.to_string());
        // Identity set keys are `{prefix}{identity}`; none may land on the index.
        if index_key.starts_with(&key_prefix) {
            return Err(ConfigError::Invalid {
                var: REVOCATION_KEY_PREFIX_ENV,
                value: key_prefix,
                reason: "index key must not start with the identity key prefix",
            });
        }

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                value: raw.clone(),
                reason: "expected a port number",
            })?,
            None => 8080,
        };

        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|raw| LogFormat::parse(&raw))
            .unwrap_or_default();

        Ok(Self {
            token: TokenSettings {
                secret,
                algorithm,
                expiry_policy,
            },
            revocation: RevocationSettings {
                redis_url,
                timeout,
                key_prefix,
                index_key,
                sweep_interval,
            },
            directory_seed: lookup(DIRECTORY_SEED_PATH_ENV).map(PathBuf::from),
            host: lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_format,
        })
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(&raw.to_uppercase()).map_err(|_| ConfigError::Invalid {
        var: TOKEN_ALGORITHM_ENV,
        value: raw.to_string(),
        reason: "unknown algorithm",
    })?;
    ensure_symmetric(algorithm)?;
    Ok(algorithm)
}

/// Only HMAC algorithms can be used with a shared secret.
pub fn ensure_symmetric(algorithm: Algorithm) -> Result<(), ConfigError> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(()),
        other => Err(ConfigError::UnsupportedAlgorithm(other)),
    }
}

fn parse_u64(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: "expected a non-negative integer",
    })
}
