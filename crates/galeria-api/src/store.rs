//! Where stored applications come from
//!
//! Production reads the hosted Supabase table through its PostgREST
//! interface. Tests and local runs use [`MemoryStore`].

use async_trait::async_trait;
use galeria_core::{ApplicationRecord, GaleriaError};
use serde_json::Value;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

/// Hosted table holding one row per application
pub const TABLE: &str = "candidaturas";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("{0}")]
    Unreachable(String),

    /// The store answered with an error; carries its own message
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response from store: {0}")]
    Decode(String),
}

impl From<StoreError> for GaleriaError {
    fn from(err: StoreError) -> Self {
        GaleriaError::BackingStore(err.to_string())
    }
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Every stored application, highest id first
    async fn list_newest_first(&self) -> Result<Vec<ApplicationRecord>, StoreError>;
}

/// Supabase table read over PostgREST
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }
}

/// PostgREST puts the human-readable part under `message`
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl ApplicationStore for SupabaseStore {
    async fn list_newest_first(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "id.desc")])
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or(body),
            });
        }

        let records: Vec<ApplicationRecord> =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        debug!(count = records.len(), "Fetched applications");
        Ok(records)
    }
}

/// In-process store; `fail_with` makes every read fail
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ApplicationRecord>>,
    failure: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new(records: Vec<ApplicationRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            failure: RwLock::new(None),
        }
    }

    pub fn insert(&self, record: ApplicationRecord) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn list_newest_first(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        if let Some(message) = self.failure.read().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(StoreError::Unreachable(message));
        }
        let mut records = self.records.read().unwrap_or_else(|e| e.into_inner()).clone();
        records.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(records)
    }
}
