//! Loaded question banks, keyed by bank id.

use std::collections::HashMap;

use futures::future::try_join_all;

use crate::error::{QuizError, ValidationError};
use crate::model::{BankInfo, Manifest, Question};
use crate::normalize::{normalize_bank, BankPayload, DroppedRecord};
use crate::traits::BankSource;

/// A bank after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBank {
    pub info: BankInfo,
    pub questions: Vec<Question>,
    /// Records that failed validation, kept for reporting.
    pub dropped: Vec<DroppedRecord>,
}

/// The manifest plus every bank loaded so far.
#[derive(Debug, Clone, Default)]
pub struct BankCatalog {
    manifest: Manifest,
    banks: HashMap<String, LoadedBank>,
}

impl BankCatalog {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            banks: HashMap::new(),
        }
    }

    /// Fetch the manifest from `source` and start an empty catalog.
    pub async fn open(source: &dyn BankSource) -> Result<Self, QuizError> {
        let manifest = source.manifest().await?;
        tracing::info!(
            source = source.name(),
            banks = manifest.banks.len(),
            "loaded banks manifest"
        );
        Ok(Self::new(manifest))
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn bank(&self, id: &str) -> Option<&LoadedBank> {
        self.banks.get(id)
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.banks.contains_key(id)
    }

    /// Load every bank in `ids` that is not cached yet.
    ///
    /// Missing banks are fetched concurrently. The catalog is only updated
    /// once all of them arrived, so a failed load leaves nothing behind.
    pub async fn ensure_loaded(
        &mut self,
        source: &dyn BankSource,
        ids: &[String],
    ) -> Result<(), QuizError> {
        let mut missing: Vec<&BankInfo> = Vec::new();
        for id in ids {
            if self.is_loaded(id) || missing.iter().any(|info| &info.id == id) {
                continue;
            }
            let info = self
                .manifest
                .find(id)
                .ok_or_else(|| ValidationError::UnknownBank(id.clone()))?;
            missing.push(info);
        }

        if missing.is_empty() {
            return Ok(());
        }

        let fetched = try_join_all(missing.iter().map(|info| async move {
            let value = source.fetch_bank(&info.file).await?;
            Ok::<_, QuizError>(((*info).clone(), value))
        }))
        .await?;

        for (info, value) in fetched {
            self.insert(info, BankPayload::from_value(value));
        }
        Ok(())
    }

    /// Normalize `payload` and cache it under `info.id`, replacing any earlier copy.
    pub fn insert(&mut self, info: BankInfo, payload: BankPayload) -> &LoadedBank {
        let outcome = normalize_bank(&info.id, payload);
        let id = info.id.clone();
        let bank = LoadedBank {
            info,
            questions: outcome.questions,
            dropped: outcome.dropped,
        };
        self.banks.insert(id.clone(), bank);
        &self.banks[&id]
    }

    /// Concatenate the questions of `ids` in the order given.
    pub fn pool(&self, ids: &[String]) -> Result<Vec<Question>, ValidationError> {
        let mut pool = Vec::new();
        for id in ids {
            let bank = self.banks.get(id).ok_or_else(|| {
                if self.manifest.find(id).is_some() {
                    ValidationError::BankNotLoaded(id.clone())
                } else {
                    ValidationError::UnknownBank(id.clone())
                }
            })?;
            pool.extend(bank.questions.iter().cloned());
        }
        Ok(pool)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::DataLoadError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts bank fetches.
    pub(crate) struct StaticSource {
        pub manifest: Manifest,
        pub files: HashMap<String, Value>,
        pub fetches: AtomicUsize,
    }

    impl StaticSource {
        pub(crate) fn two_banks() -> Self {
            let rec = |id: i64| {
                json!({"id": id, "question": format!("Q{id}?"), "options": ["a", "b", "c", "d"], "answer_index": 1})
            };
            let manifest = Manifest {
                banks: vec![
                    BankInfo {
                        id: "net".into(),
                        title: "Networking".into(),
                        file: "net.json".into(),
                        count: Some(3),
                    },
                    BankInfo {
                        id: "os".into(),
                        title: "Operating Systems".into(),
                        file: "os.json".into(),
                        count: None,
                    },
                    BankInfo {
                        id: "gone".into(),
                        title: "Missing file".into(),
                        file: "gone.json".into(),
                        count: None,
                    },
                ],
            };
            let mut files = HashMap::new();
            files.insert("net.json".to_string(), json!([rec(1), rec(2), rec(3)]));
            files.insert(
                "os.json".to_string(),
                json!({"meta": {}, "questions": [rec(1), rec(2), {"question": ""}]}),
            );
            Self {
                manifest,
                files,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BankSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn manifest(&self) -> Result<Manifest, DataLoadError> {
            Ok(self.manifest.clone())
        }

        async fn fetch_bank(&self, file: &str) -> Result<Value, DataLoadError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(file)
                .cloned()
                .ok_or_else(|| DataLoadError::BankUnavailable {
                    file: file.to_string(),
                    reason: "not found".into(),
                })
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn loads_banks_once() {
        let source = StaticSource::two_banks();
        let mut catalog = BankCatalog::open(&source).await.unwrap();
        assert_eq!(catalog.manifest().banks.len(), 3);

        catalog
            .ensure_loaded(&source, &ids(&["net", "os", "net"]))
            .await
            .unwrap();
        catalog.ensure_loaded(&source, &ids(&["os"])).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

        let os = catalog.bank("os").unwrap();
        assert_eq!(os.questions.len(), 2);
        assert_eq!(os.dropped.len(), 1);

        let pool = catalog.pool(&ids(&["os", "net"])).unwrap();
        assert_eq!(pool.len(), 5);
        assert_eq!(pool[0].bank_id, "os");
    }

    #[tokio::test]
    async fn unknown_bank_is_a_validation_error() {
        let source = StaticSource::two_banks();
        let mut catalog = BankCatalog::open(&source).await.unwrap();
        let err = catalog
            .ensure_loaded(&source, &ids(&["net", "history"]))
            .await
            .unwrap_err();
        assert_eq!(err, QuizError::Validation(ValidationError::UnknownBank("history".into())));
        assert!(!catalog.is_loaded("net"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_no_partial_state() {
        let source = StaticSource::two_banks();
        let mut catalog = BankCatalog::open(&source).await.unwrap();
        let err = catalog
            .ensure_loaded(&source, &ids(&["net", "gone"]))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::DataLoad(DataLoadError::BankUnavailable { .. })));
        assert!(!catalog.is_loaded("net"));
    }

    #[test]
    fn pool_distinguishes_unloaded_from_unknown() {
        let source = StaticSource::two_banks();
        let catalog = BankCatalog::new(source.manifest.clone());
        assert_eq!(
            catalog.pool(&ids(&["net"])).unwrap_err(),
            ValidationError::BankNotLoaded("net".into())
        );
        assert_eq!(
            catalog.pool(&ids(&["nope"])).unwrap_err(),
            ValidationError::UnknownBank("nope".into())
        );
    }
}
