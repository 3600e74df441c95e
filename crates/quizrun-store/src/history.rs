//! The two bounded history collections: seen identity keys and attempt records.

use serde::de::DeserializeOwned;
use serde::Serialize;

use quizrun_core::attempt::AttemptRecord;
use quizrun_core::model::SeenSet;

use crate::backend::KvBackend;
use crate::error::StoreError;

pub const SEEN_KEYS_KEY: &str = "quizrun_seen_keys_v1";
pub const ATTEMPTS_KEY: &str = "quizrun_attempts_v1";

/// Newest seen keys kept on save.
pub const SEEN_KEYS_CAP: usize = 20_000;
/// Newest attempt records kept on save.
pub const ATTEMPTS_CAP: usize = 30;

/// Seen-set and attempt history on top of a [`KvBackend`].
///
/// Loads never fail: a missing or corrupt collection reads as empty.
#[derive(Debug, Clone)]
pub struct HistoryStore<B> {
    backend: B,
}

impl<B: KvBackend> HistoryStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn load_seen(&self) -> SeenSet {
        self.load_list::<String>(SEEN_KEYS_KEY).into_iter().collect()
    }

    /// Persist the newest [`SEEN_KEYS_CAP`] keys of `seen`.
    pub fn save_seen(&mut self, seen: &SeenSet) -> Result<(), StoreError> {
        let kept = seen.most_recent(SEEN_KEYS_CAP);
        if kept.len() < seen.len() {
            tracing::debug!(dropped = seen.len() - kept.len(), "trimmed oldest seen keys");
        }
        self.save_list(SEEN_KEYS_KEY, kept)
    }

    /// Attempt records, most recent first.
    pub fn load_attempts(&self) -> Vec<AttemptRecord> {
        self.load_list(ATTEMPTS_KEY)
    }

    /// Put `record` at the front of the attempt history, keeping the newest [`ATTEMPTS_CAP`].
    pub fn save_attempt(&mut self, record: AttemptRecord) -> Result<(), StoreError> {
        let mut attempts = self.load_attempts();
        attempts.insert(0, record);
        attempts.truncate(ATTEMPTS_CAP);
        self.save_list(ATTEMPTS_KEY, &attempts)
    }

    /// Remove both collections.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(SEEN_KEYS_KEY)?;
        self.backend.remove(ATTEMPTS_KEY)?;
        tracing::info!("cleared history");
        Ok(())
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.backend.get(key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt history collection, starting empty");
                Vec::new()
            }
        }
    }

    fn save_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &json).inspect_err(|e| {
            tracing::warn!(key, error = %e, "failed to save history collection");
        })
    }
}
