//! The seam between the engine and wherever bank files live.
//!
//! Implemented by the `quizrun-banks` crate (local directory, HTTP, mock).

use async_trait::async_trait;

use crate::error::DataLoadError;
use crate::model::Manifest;

/// Retrieves the bank manifest and raw bank payloads.
#[async_trait]
pub trait BankSource: Send + Sync {
    /// Human-readable source name (e.g. "directory").
    fn name(&self) -> &str;

    /// Load the manifest that lists available banks.
    async fn manifest(&self) -> Result<Manifest, DataLoadError>;

    /// Load one bank file, named as in its manifest entry, as parsed JSON.
    async fn fetch_bank(&self, file: &str) -> Result<serde_json::Value, DataLoadError>;
}
