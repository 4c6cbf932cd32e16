use galeria_core::GaleriaError;
use galeria_rules::{Locale, RuleTable};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::autosave::{DraftStorage, FileStorage, MemoryStorage};
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

pub const DEFAULT_ENDPOINT: &str = "https://galeria-secreta-backend.onrender.com/api/candidatura";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub retry: RetryPolicy,
    /// Draft file; drafts live in memory only when unset
    pub draft_path: Option<PathBuf>,
    pub locale: Locale,
    /// YAML rule table replacing the standard rules
    pub rules_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry: RetryPolicy::default(),
            draft_path: None,
            locale: Locale::Pt,
            rules_path: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, GaleriaError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key-value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GaleriaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_attempts: u32 = try_load(&lookup, "GALERIA_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(GaleriaError::Config(
                "GALERIA_MAX_ATTEMPTS must be at least 1".into(),
            ));
        }
        let base_delay_ms: u64 = try_load(&lookup, "GALERIA_RETRY_BASE_MS", 1000)?;

        Ok(Self {
            endpoint: lookup("GALERIA_ENDPOINT").unwrap_or_else(|| {
                info!("GALERIA_ENDPOINT not set, using default: {DEFAULT_ENDPOINT}");
                DEFAULT_ENDPOINT.to_string()
            }),
            retry: RetryPolicy::default()
                .with_max_attempts(max_attempts)
                .with_base_delay(Duration::from_millis(base_delay_ms)),
            draft_path: lookup("GALERIA_DRAFT_PATH").map(PathBuf::from),
            locale: try_load(&lookup, "GALERIA_LOCALE", Locale::Pt)?,
            rules_path: lookup("GALERIA_RULES").map(PathBuf::from),
        })
    }

    pub fn open_storage(&self) -> Result<Box<dyn DraftStorage>, GaleriaError> {
        match &self.draft_path {
            Some(path) => FileStorage::open(path)
                .map(|s| Box::new(s) as Box<dyn DraftStorage>)
                .map_err(|e| GaleriaError::Config(e.to_string())),
            None => {
                warn!("GALERIA_DRAFT_PATH not set, drafts will not survive a restart");
                Ok(Box::new(MemoryStorage::new()))
            }
        }
    }

    pub fn rule_table(&self) -> Result<RuleTable, GaleriaError> {
        match &self.rules_path {
            Some(path) => {
                RuleTable::from_yaml_file(path).map_err(|e| GaleriaError::Config(e.to_string()))
            }
            None => Ok(RuleTable::standard(self.locale)),
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T, GaleriaError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            GaleriaError::Config(format!("invalid {key}: {e}"))
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
