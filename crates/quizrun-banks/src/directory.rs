//! Bank source backed by a local directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use quizrun_core::error::DataLoadError;
use quizrun_core::model::Manifest;
use quizrun_core::traits::BankSource;

use crate::MANIFEST_FILE;

/// Reads `banks.json` and the bank files it lists from one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a manifest file name inside the root, refusing anything that climbs out of it.
    fn resolve(&self, file: &str) -> Option<PathBuf> {
        let relative = Path::new(file);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        (contained && !file.is_empty()).then(|| self.root.join(relative))
    }
}

async fn read_json(path: &Path) -> Result<Value, (ErrorKind, String)> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| (e.kind(), e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| (ErrorKind::InvalidData, e.to_string()))
}

#[async_trait]
impl BankSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn manifest(&self) -> Result<Manifest, DataLoadError> {
        let path = self.root.join(MANIFEST_FILE);
        let value = read_json(&path).await.map_err(|(kind, reason)| match kind {
            ErrorKind::InvalidData => DataLoadError::Malformed {
                resource: MANIFEST_FILE.to_string(),
                reason,
            },
            _ => DataLoadError::ManifestUnavailable {
                reason: format!("{}: {reason}", path.display()),
            },
        })?;

        serde_json::from_value(value).map_err(|e| DataLoadError::Malformed {
            resource: MANIFEST_FILE.to_string(),
            reason: e.to_string(),
        })
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn fetch_bank(&self, file: &str) -> Result<Value, DataLoadError> {
        let path = self.resolve(file).ok_or_else(|| DataLoadError::BankUnavailable {
            file: file.to_string(),
            reason: "path is outside the banks directory".into(),
        })?;

        let value = read_json(&path).await.map_err(|(kind, reason)| match kind {
            ErrorKind::InvalidData => DataLoadError::Malformed {
                resource: file.to_string(),
                reason,
            },
            _ => DataLoadError::BankUnavailable {
                file: file.to_string(),
                reason,
            },
        })?;
        tracing::debug!(file, "read bank file");
        Ok(value)
    }
}
