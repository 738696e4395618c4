use std::path::PathBuf;

use crate::{errors::AppError, identity::IdentityMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    JsonFile { data_dir: PathBuf },
    Redis { url: String, key_prefix: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage: StorageConfig,
    pub static_dir: PathBuf,
    pub allowed_origins: AllowedOrigins,
    pub identity_mode: IdentityMode,
    pub trust_forwarded_for: bool,
    pub rate_limit_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            storage: StorageConfig::JsonFile {
                data_dir: PathBuf::from("data"),
            },
            static_dir: PathBuf::from("public"),
            allowed_origins: AllowedOrigins::Any,
            identity_mode: IdentityMode::PerAddress,
            trust_forwarded_for: false,
            rate_limit_per_minute: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::EnvError(format!("PORT must be a port number, got {raw}")))?,
            None => defaults.port,
        };

        let storage = match var("STORAGE_BACKEND").as_deref() {
            None | Some("json") => StorageConfig::JsonFile {
                data_dir: var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data")),
            },
            Some("memory") => StorageConfig::Memory,
            Some("redis") => StorageConfig::Redis {
                url: var("REDIS_URL").ok_or_else(|| {
                    AppError::EnvError("REDIS_URL must be set for the redis backend".into())
                })?,
                key_prefix: var("REDIS_KEY_PREFIX").unwrap_or_else(|| "reelnotes".into()),
            },
            Some(other) => {
                return Err(AppError::EnvError(format!(
                    "Unknown STORAGE_BACKEND '{other}', expected json, redis or memory"
                )));
            }
        };

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            None => defaults.allowed_origins,
            Some(raw) if raw == "*" => AllowedOrigins::Any,
            Some(raw) => AllowedOrigins::List(
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        };

        let identity_mode = match var("VOTE_IDENTITY") {
            Some(raw) => raw.parse::<IdentityMode>()?,
            None => defaults.identity_mode,
        };

        let trust_forwarded_for = match var("TRUST_FORWARDED_FOR") {
            Some(raw) => parse_bool("TRUST_FORWARDED_FOR", &raw)?,
            None => defaults.trust_forwarded_for,
        };

        let rate_limit_per_minute = match var("RATE_LIMIT_PER_MINUTE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::EnvError(format!(
                        "RATE_LIMIT_PER_MINUTE must be a positive integer, got {raw}"
                    ))
                })?,
            None => defaults.rate_limit_per_minute,
        };

        Ok(Self {
            port,
            storage,
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            allowed_origins,
            identity_mode,
            trust_forwarded_for,
            rate_limit_per_minute,
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::EnvError(format!(
            "{key} must be a boolean, got {raw}"
        ))),
    }
}
