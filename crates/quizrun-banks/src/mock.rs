//! In-memory bank source for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use quizrun_core::error::DataLoadError;
use quizrun_core::model::{BankInfo, Manifest};
use quizrun_core::traits::BankSource;

/// A bank source that serves payloads registered up front.
///
/// Lets the catalog and attempt engine run without touching disk or network.
#[derive(Debug, Default)]
pub struct MockSource {
    manifest: Manifest,
    files: HashMap<String, Value>,
    /// Number of `fetch_bank` calls made.
    fetch_count: AtomicU32,
    manifest_offline: bool,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bank listed in the manifest and served from `{id}.json`.
    pub fn with_bank(mut self, id: &str, title: &str, payload: Value) -> Self {
        let file = format!("{id}.json");
        self.manifest.banks.push(BankInfo {
            id: id.to_string(),
            title: title.to_string(),
            file: file.clone(),
            count: None,
        });
        self.files.insert(file, payload);
        self
    }

    /// List a bank in the manifest whose file cannot be fetched.
    pub fn with_missing_bank(mut self, id: &str, title: &str) -> Self {
        self.manifest.banks.push(BankInfo {
            id: id.to_string(),
            title: title.to_string(),
            file: format!("{id}.json"),
            count: None,
        });
        self
    }

    /// Make every manifest request fail.
    pub fn offline(mut self) -> Self {
        self.manifest_offline = true;
        self
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BankSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn manifest(&self) -> Result<Manifest, DataLoadError> {
        if self.manifest_offline {
            return Err(DataLoadError::ManifestUnavailable {
                reason: "mock source is offline".into(),
            });
        }
        Ok(self.manifest.clone())
    }

    async fn fetch_bank(&self, file: &str) -> Result<Value, DataLoadError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.files
            .get(file)
            .cloned()
            .ok_or_else(|| DataLoadError::BankUnavailable {
                file: file.to_string(),
                reason: "not registered with mock source".into(),
            })
    }
}
