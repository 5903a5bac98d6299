// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Settings are read from the environment once at startup and handed to the
//! rest of the application as an immutable [`Settings`] value.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SUPABASE_URL` | Supabase project URL | Required |
//! | `SUPABASE_KEY` | Public (anon) key, `SUPABASE_ANON_KEY` also accepted | Required |
//! | `SUPABASE_SERVICE_KEY` | Service-role key for privileged calls | Required |
//! | `SUPABASE_JWT_SECRET` | Shared secret used to verify access tokens | Required |
//! | `ALGORITHM` | Token signing algorithm | `HS256` |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance for `exp`/`nbf` | `0` |
//! | `BACKEND_CORS_ORIGINS` | Comma separated origins, or `*` | `http://localhost:3000,http://localhost:8000` |
//! | `API_V1_STR` | Prefix for all API routes | `/api/v1` |
//! | `PROJECT_NAME` | Title used in the OpenAPI document | `Supabase Gateway` |
//! | `PROVIDER_TIMEOUT_SECS` | Timeout for each Supabase request | `15` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8000` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files, serve HTTPS when both are set | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use jsonwebtoken::Algorithm;
use url::Url;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_KEY";
/// Older deployments used this name for the anon key.
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const SUPABASE_SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_KEY";
pub const SUPABASE_JWT_SECRET_ENV: &str = "SUPABASE_JWT_SECRET";
pub const ALGORITHM_ENV: &str = "ALGORITHM";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const CORS_ORIGINS_ENV: &str = "BACKEND_CORS_ORIGINS";
pub const API_PREFIX_ENV: &str = "API_V1_STR";
pub const PROJECT_NAME_ENV: &str = "PROJECT_NAME";
pub const PROVIDER_TIMEOUT_ENV: &str = "PROVIDER_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_ALGORITHM: &str = "HS256";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8000";
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_PROJECT_NAME: &str = "Supabase Gateway";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Both halves of a PEM certificate/key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Application settings.
#[derive(Clone)]
pub struct Settings {
    pub supabase_url: Url,
    pub anon_key: String,
    pub service_key: String,
    pub jwt_secret: String,
    pub algorithm: Algorithm,
    pub jwt_leeway: u64,
    pub cors_origins: CorsOrigins,
    pub api_prefix: String,
    pub project_name: String,
    pub provider_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("algorithm", &self.algorithm)
            .field("jwt_leeway", &self.jwt_leeway)
            .field("cors_origins", &self.cors_origins)
            .field("api_prefix", &self.api_prefix)
            .field("project_name", &self.project_name)
            .field("provider_timeout", &self.provider_timeout)
            .field("bind_addr", &self.bind_addr)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let raw_url = vars.required(SUPABASE_URL_ENV)?;
        let supabase_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: SUPABASE_URL_ENV,
            reason: e.to_string(),
        })?;
        if !matches!(supabase_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: SUPABASE_URL_ENV,
                reason: format!("unsupported scheme `{}`", supabase_url.scheme()),
            });
        }

        let anon_key = match vars.optional(SUPABASE_KEY_ENV) {
            Some(key) => key,
            None => vars.required(SUPABASE_ANON_KEY_ENV).map_err(|_| {
                ConfigError::Missing(SUPABASE_KEY_ENV)
            })?,
        };
        let service_key = vars.required(SUPABASE_SERVICE_KEY_ENV)?;
        let jwt_secret = vars.required(SUPABASE_JWT_SECRET_ENV)?;

        let algorithm = parse_algorithm(&vars.or_default(ALGORITHM_ENV, DEFAULT_ALGORITHM))?;
        let jwt_leeway = vars.parsed(JWT_LEEWAY_ENV, 0u64)?;

        let cors_origins = parse_cors_origins(&vars.or_default(CORS_ORIGINS_ENV, DEFAULT_CORS_ORIGINS));

        let api_prefix = normalize_prefix(&vars.or_default(API_PREFIX_ENV, DEFAULT_API_PREFIX));
        let project_name = vars.or_default(PROJECT_NAME_ENV, DEFAULT_PROJECT_NAME);
        let provider_timeout =
            Duration::from_secs(vars.parsed(PROVIDER_TIMEOUT_ENV, DEFAULT_PROVIDER_TIMEOUT_SECS)?);

        let host = vars.or_default(HOST_ENV, DEFAULT_HOST);
        let port = vars.parsed(PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let tls = match (vars.optional(TLS_CERT_PATH_ENV), vars.optional(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match vars.or_default(LOG_FORMAT_ENV, "pretty").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            supabase_url,
            anon_key,
            service_key,
            jwt_secret,
            algorithm,
            jwt_leeway,
            cors_origins,
            api_prefix,
            project_name,
            provider_timeout,
            bind_addr,
            tls,
            log_format,
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

/// Only HMAC algorithms make sense with a shared secret.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::Invalid {
            name: ALGORITHM_ENV,
            reason: format!("`{other}` is not a shared-secret algorithm"),
        }),
    }
}

fn parse_cors_origins(raw: &str) -> CorsOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
