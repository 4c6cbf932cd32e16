use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_REALM: &str = "Galeria Secreta";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Never print the password.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// How the panel is exposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessMode {
    /// Everything behind HTTP Basic Auth, static files from disk
    Basic { credentials: Credentials, realm: String },
    /// Any origin may read the listing
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Supabase { url: String, key: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreConfig,
    pub access: AccessMode,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("GALERIA_STORE").as_deref() {
            Some("memory") => {
                warn!("GALERIA_STORE=memory, serving an empty in-process store");
                StoreConfig::Memory
            }
            Some("supabase") | None => StoreConfig::Supabase {
                url: required(&lookup, "SUPABASE_URL")?,
                key: required(&lookup, "SUPABASE_KEY")?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "GALERIA_STORE",
                    message: format!("expected supabase or memory, got {other}"),
                })
            }
        };

        let access = match lookup("PANEL_ACCESS").as_deref() {
            Some("open") => AccessMode::Open,
            Some("basic") | None => AccessMode::Basic {
                credentials: Credentials {
                    username: required(&lookup, "PANEL_USER")?,
                    password: required(&lookup, "PANEL_PASSWORD")?,
                },
                realm: lookup("PANEL_REALM").unwrap_or_else(|| DEFAULT_REALM.to_string()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "PANEL_ACCESS",
                    message: format!("expected basic or open, got {other}"),
                })
            }
        };

        Ok(Self {
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            store,
            access,
            static_dir: lookup("STATIC_DIR")
                .unwrap_or_else(|| {
                    info!("STATIC_DIR not set, using default: {DEFAULT_STATIC_DIR}");
                    DEFAULT_STATIC_DIR.to_string()
                })
                .into(),
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            warn!("Environment variable {key} not found");
            ConfigError::Missing(key)
        })
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
