//! Draft auto-save
//!
//! Field values are mirrored into a key-value store under
//! `galeria_secreta_form_<name>` so an interrupted application survives a
//! restart. Writes are debounced per field; file and checkbox controls are
//! never stored.

use galeria_core::{draft_key, FieldSnapshot, DRAFT_PREFIX};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::form::ApplicationForm;

/// Quiet period before a typed value is written
pub const DRAFT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("draft storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("draft storage is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat string key-value storage, the shape of browser `localStorage`
pub trait DraftStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open `path`, starting empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened draft storage");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl DraftStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

pub struct AutoSave {
    storage: Box<dyn DraftStorage>,
    pending: Debouncer<String, String>,
}

impl AutoSave {
    pub fn new(storage: Box<dyn DraftStorage>) -> Self {
        Self::with_quiet_period(storage, DRAFT_DEBOUNCE)
    }

    pub fn with_quiet_period(storage: Box<dyn DraftStorage>, quiet: Duration) -> Self {
        Self {
            storage,
            pending: Debouncer::new(quiet),
        }
    }

    /// Queue a field's current value; ignored for file and checkbox controls
    pub fn record(&mut self, field: &FieldSnapshot, now: Instant) {
        if !field.kind.is_draftable() {
            return;
        }
        self.pending.push(field.name.clone(), field.value.clone(), now);
    }

    /// Write every queued value whose field has been quiet long enough
    pub fn flush_due(&mut self, now: Instant) -> Result<usize, StorageError> {
        let due = self.pending.due(now);
        self.write(due, now)
    }

    /// Write every queued value now
    pub fn flush(&mut self) -> Result<usize, StorageError> {
        let all = self.pending.drain();
        self.write(all, Instant::now())
    }

    /// On a failed `set`, that entry and every one after it go back in the
    /// queue already due, so the next flush retries them.
    fn write(&mut self, entries: Vec<(String, String)>, now: Instant) -> Result<usize, StorageError> {
        let mut written = 0;
        let mut entries = entries.into_iter();
        while let Some((name, value)) = entries.next() {
            if let Err(err) = self.storage.set(&draft_key(&name), &value) {
                let due_at = now.checked_sub(self.pending.quiet_period()).unwrap_or(now);
                self.pending.push(name, value, due_at);
                for (name, value) in entries {
                    self.pending.push(name, value, due_at);
                }
                return Err(err);
            }
            written += 1;
        }
        Ok(written)
    }

    pub fn load(&self, field_name: &str) -> Result<Option<String>, StorageError> {
        self.storage.get(&draft_key(field_name))
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Fill every eligible field from its draft; returns how many were restored
    pub fn restore(&self, form: &mut ApplicationForm) -> Result<usize, StorageError> {
        let mut restored = 0;
        for field in form.fields_mut() {
            if !field.kind.is_draftable() {
                continue;
            }
            // An empty draft is the same as no draft.
            if let Some(value) = self.load(&field.name)?.filter(|v| !v.is_empty()) {
                field.value = value;
                restored += 1;
            }
        }
        Ok(restored)
    }

    /// Forget queued writes and delete every draft under the namespace
    pub fn clear_all(&mut self) -> Result<usize, StorageError> {
        self.pending.cancel_all();
        let keys: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(DRAFT_PREFIX))
            .collect();
        for key in &keys {
            self.storage.remove(key)?;
        }
        if !keys.is_empty() {
            debug!(removed = keys.len(), "Cleared drafts");
        }
        Ok(keys.len())
    }

    /// Log-and-continue wrapper for UI paths where a storage failure must not interrupt the user
    pub(crate) fn report(result: Result<usize, StorageError>, action: &str) -> usize {
        result.unwrap_or_else(|e| {
            warn!(error = %e, action, "Draft storage failed");
            0
        })
    }
}
